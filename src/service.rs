use crate::{
    codegen::{CodeGenerator, CodePolicy},
    error::LinkError,
    models::Link,
    store::{LinkStore, StoreError},
};
use std::{str::FromStr, sync::Arc};

/// How many generated candidates are tried before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Whether links belong to the client that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScoping {
    /// Every operation except the redirect needs an owner id and only sees
    /// that owner's links.
    Enabled,
    /// One shared namespace; owner ids are ignored.
    Disabled,
}

impl OwnerScoping {
    /// Custom-code length rules that go with this deployment mode.
    pub fn code_policy(self) -> CodePolicy {
        match self {
            OwnerScoping::Enabled => CodePolicy::SCOPED,
            OwnerScoping::Disabled => CodePolicy::SHARED,
        }
    }
}

impl FromStr for OwnerScoping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" | "on" | "true" => Ok(OwnerScoping::Enabled),
            "disabled" | "off" | "false" => Ok(OwnerScoping::Disabled),
            other => Err(format!(
                "unknown owner scoping '{other}', expected 'enabled' or 'disabled'"
            )),
        }
    }
}

/// Link lifecycle and redirect tracking on top of an injected store and
/// code generator.
#[derive(Clone)]
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    generator: Arc<dyn CodeGenerator>,
    scoping: OwnerScoping,
    policy: CodePolicy,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn LinkStore>,
        generator: Arc<dyn CodeGenerator>,
        scoping: OwnerScoping,
    ) -> Self {
        Self {
            store,
            generator,
            scoping,
            policy: scoping.code_policy(),
        }
    }

    /// Validate, pick a short code, and persist a new link.
    ///
    /// Nothing is written unless every check passes.
    pub async fn create_link(
        &self,
        original_url: &str,
        custom_code: Option<&str>,
        owner_id: Option<&str>,
    ) -> Result<Link, LinkError> {
        if !crate::codegen::validate_url(original_url) {
            return Err(LinkError::InvalidUrl);
        }

        let owner = match self.scoping {
            OwnerScoping::Enabled => Some(require_owner(owner_id)?.to_owned()),
            OwnerScoping::Disabled => None,
        };

        let link = match custom_code {
            Some(code) => self.insert_custom(code, original_url, owner).await?,
            None => self.insert_generated(original_url, owner).await?,
        };

        tracing::info!(
            code = %link.short_code,
            owner = link.owner_id.as_deref().unwrap_or("-"),
            "Link created"
        );
        Ok(link)
    }

    async fn insert_custom(
        &self,
        code: &str,
        original_url: &str,
        owner: Option<String>,
    ) -> Result<Link, LinkError> {
        if !self.policy.accepts(code) {
            return Err(LinkError::InvalidCode {
                min_len: self.policy.min_len,
                max_len: self.policy.max_len,
            });
        }

        // Advisory; the store's unique insert has the final word.
        if self.store.find_by_code(code).await?.is_some() {
            return Err(LinkError::CodeTaken(code.to_owned()));
        }

        Ok(self
            .store
            .insert(Link::new(code, original_url, owner))
            .await?)
    }

    async fn insert_generated(
        &self,
        original_url: &str,
        owner: Option<String>,
    ) -> Result<Link, LinkError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = self.generator.candidate();
            if crate::codegen::is_reserved(&code) || self.store.find_by_code(&code).await?.is_some()
            {
                continue;
            }

            match self
                .store
                .insert(Link::new(code, original_url, owner.clone()))
                .await
            {
                Ok(link) => return Ok(link),
                Err(StoreError::DuplicateKey(code)) => {
                    tracing::warn!(%code, attempt, "Generated code lost an insert race");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "Could not find a free short code"
        );
        Err(LinkError::GenerationExhausted)
    }

    /// All links visible to the caller, newest first.
    pub async fn list_links(&self, owner_id: Option<&str>) -> Result<Vec<Link>, LinkError> {
        let links = match self.scoping {
            OwnerScoping::Enabled => self.store.list_by_owner(require_owner(owner_id)?).await?,
            OwnerScoping::Disabled => self.store.list_all().await?,
        };
        Ok(links)
    }

    pub async fn get_link(&self, code: &str, owner_id: Option<&str>) -> Result<Link, LinkError> {
        let link = match self.scoping {
            OwnerScoping::Enabled => {
                let owner = require_owner(owner_id)?;
                self.store.find_by_code_and_owner(code, owner).await?
            }
            OwnerScoping::Disabled => self.store.find_by_code(code).await?,
        };
        link.ok_or(LinkError::NotFound)
    }

    /// Remove a link. With scoping on, only its owner can.
    pub async fn delete_link(&self, code: &str, owner_id: Option<&str>) -> Result<(), LinkError> {
        let removed = match self.scoping {
            OwnerScoping::Enabled => {
                let owner = require_owner(owner_id)?;
                self.store.delete_by_code_and_owner(code, owner).await?
            }
            OwnerScoping::Disabled => self.store.delete_by_code(code).await?,
        };

        if !removed {
            return Err(LinkError::NotFound);
        }
        tracing::info!(%code, "Link deleted");
        Ok(())
    }

    /// The public redirect path: count the click and hand back the target.
    ///
    /// Never scoped by owner. The increment is a single store operation, so
    /// concurrent redirects on one code all land.
    pub async fn resolve_and_track(&self, code: &str) -> Result<String, LinkError> {
        let link = self
            .store
            .increment_clicks(code)
            .await?
            .ok_or(LinkError::NotFound)?;

        tracing::debug!(%code, clicks = link.clicks, "Redirect");
        Ok(link.original_url)
    }

    /// Store connectivity, for `/healthz`.
    pub async fn health(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

fn require_owner(owner_id: Option<&str>) -> Result<&str, LinkError> {
    owner_id
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .ok_or(LinkError::MissingOwner)
}
