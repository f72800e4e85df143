pub mod memory;
pub mod sqlite;

pub use memory::MemoryLinkStore;
pub use sqlite::SqliteLinkStore;

use crate::models::Link;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A link with this short code already exists.
    #[error("short code '{0}' already exists")]
    DuplicateKey(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence contract for links.
///
/// The store only enforces short-code uniqueness; format rules live in
/// [`crate::codegen`]. Both `insert` and `increment_clicks` must be atomic
/// with respect to concurrent callers.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError>;

    async fn find_by_code_and_owner(
        &self,
        code: &str,
        owner_id: &str,
    ) -> Result<Option<Link>, StoreError>;

    /// All links of one owner, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, StoreError>;

    /// Every link, newest first.
    async fn list_all(&self) -> Result<Vec<Link>, StoreError>;

    /// Insert a new link. Fails with [`StoreError::DuplicateKey`] if the short
    /// code is taken, including when another insert wins a race for it.
    async fn insert(&self, link: Link) -> Result<Link, StoreError>;

    /// Add one click and stamp `last_clicked_at` in a single step. The stamp
    /// never moves backwards.
    async fn increment_clicks(&self, code: &str) -> Result<Option<Link>, StoreError>;

    async fn delete_by_code_and_owner(&self, code: &str, owner_id: &str)
        -> Result<bool, StoreError>;

    async fn delete_by_code(&self, code: &str) -> Result<bool, StoreError>;

    /// Cheap connectivity probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release connections at shutdown.
    async fn close(&self) {}
}
