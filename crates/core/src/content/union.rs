use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::{SettingsError, WriteStatus};

use super::ContentResolver;

/// Tries its delegates in order and returns the first content found.
///
/// Appending publishes a new delegate list; readers keep whichever snapshot
/// they loaded.
pub struct UnionContentResolver {
    delegates: ArcSwap<Vec<Arc<dyn ContentResolver>>>,
}

impl UnionContentResolver {
    pub fn new() -> Self {
        Self {
            delegates: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn from_resolvers(resolvers: Vec<Arc<dyn ContentResolver>>) -> Self {
        Self {
            delegates: ArcSwap::from_pointee(resolvers),
        }
    }

    pub fn len(&self) -> usize {
        self.delegates.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.load().is_empty()
    }
}

impl Default for UnionContentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UnionContentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionContentResolver")
            .field("delegates", &self.len())
            .finish()
    }
}

impl ContentResolver for UnionContentResolver {
    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let snapshot = self.delegates.load();
        snapshot.iter().find_map(|resolver| resolver.get_content(key))
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        let snapshot = self.delegates.load();
        for resolver in snapshot.iter() {
            if resolver.set_content(key, value).is_success() {
                return WriteStatus::Success;
            }
        }
        WriteStatus::NotPossible
    }

    fn add_content_resolver(&self, resolver: Arc<dyn ContentResolver>) -> Result<(), SettingsError> {
        self.delegates.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&resolver));
            next
        });
        Ok(())
    }
}
