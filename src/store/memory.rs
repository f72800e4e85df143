use super::{LinkStore, StoreError};
use crate::models::Link;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Thread-safe in-memory store mapping short_code -> link.
///
/// Backed by a DashMap: inserts go through the entry API and click increments
/// mutate the row under its shard lock, so both are atomic per code. Each row
/// carries an insertion sequence number to break `created_at` ties.
#[derive(Clone, Debug, Default)]
pub struct MemoryLinkStore {
    inner: Arc<DashMap<String, (u64, Link)>>,
    seq: Arc<AtomicU64>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn collect_newest_first(&self, keep: impl Fn(&Link) -> bool) -> Vec<Link> {
        let mut rows: Vec<(u64, Link)> = self
            .inner
            .iter()
            .filter(|row| keep(&row.value().1))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });
        rows.into_iter().map(|(_, link)| link).collect()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError> {
        Ok(self.inner.get(code).map(|row| row.1.clone()))
    }

    async fn find_by_code_and_owner(
        &self,
        code: &str,
        owner_id: &str,
    ) -> Result<Option<Link>, StoreError> {
        Ok(self
            .inner
            .get(code)
            .filter(|row| row.1.owner_id.as_deref() == Some(owner_id))
            .map(|row| row.1.clone()))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Link>, StoreError> {
        Ok(self.collect_newest_first(|link| link.owner_id.as_deref() == Some(owner_id)))
    }

    async fn list_all(&self) -> Result<Vec<Link>, StoreError> {
        Ok(self.collect_newest_first(|_| true))
    }

    async fn insert(&self, link: Link) -> Result<Link, StoreError> {
        match self.inner.entry(link.short_code.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(link.short_code)),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, link.clone()));
                Ok(link)
            }
        }
    }

    async fn increment_clicks(&self, code: &str) -> Result<Option<Link>, StoreError> {
        Ok(self.inner.get_mut(code).map(|mut row| {
            let link = &mut row.1;
            link.clicks += 1;
            link.last_clicked_at = link.last_clicked_at.max(Some(Utc::now()));
            link.clone()
        }))
    }

    async fn delete_by_code_and_owner(
        &self,
        code: &str,
        owner_id: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .remove_if(code, |_, row| row.1.owner_id.as_deref() == Some(owner_id))
            .is_some())
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.inner.remove(code).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
