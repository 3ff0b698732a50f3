// src/formatting/relations.rs
//! Relation Resolver: page ids to display names, memoized for the run.

use crate::api::NotionRepository;
use crate::constants::{RELATION_CACHE_CAPACITY, UNTITLED_TITLE};
use crate::error::AppError;
use crate::types::PageId;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub struct RelationResolver {
    repository: Arc<dyn NotionRepository>,
    cache: Mutex<LruCache<PageId, String>>,
}

impl RelationResolver {
    pub fn new(repository: Arc<dyn NotionRepository>) -> Self {
        Self::with_capacity(repository, RELATION_CACHE_CAPACITY)
    }

    pub fn with_capacity(repository: Arc<dyn NotionRepository>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            repository,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Display names for `ids`, in order.
    ///
    /// The first failed lookup is returned and the remaining ids are not
    /// fetched; the caller fails the whole document.
    pub async fn resolve(&self, ids: &[PageId]) -> Result<Vec<String>, AppError> {
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            let cached = self.cache.lock().get(id).cloned();
            if let Some(name) = cached {
                names.push(name);
                continue;
            }

            let target = self.repository.retrieve_document(id).await?;
            let mut name = target.title_text();
            if name.trim().is_empty() {
                name = UNTITLED_TITLE.to_string();
            }
            log::debug!("Resolved relation {} -> '{}'", id, name);
            self.cache.lock().put(id.clone(), name.clone());
            names.push(name);
        }
        Ok(names)
    }
}
