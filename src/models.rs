use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened link record from the `links` table.
///
/// The store's row id is never selected; callers only ever see the short code.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Link {
    pub short_code: String,
    pub original_url: String,
    pub owner_id: Option<String>,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// A fresh, never-clicked link stamped with the current time.
    pub fn new(
        short_code: impl Into<String>,
        original_url: impl Into<String>,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            owner_id,
            clicks: 0,
            last_clicked_at: None,
            created_at: Utc::now(),
        }
    }
}

/// The public JSON shape of a link returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub short_code: String,
    pub original_url: String,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkSummary {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            clicks: link.clicks,
            last_clicked_at: link.last_clicked_at,
            created_at: link.created_at,
        }
    }
}
