use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::content::ContentResolver;
use crate::error::{SettingsError, WriteStatus};

use super::{ObjectResolver, SettingsObject};

/// Tries its delegates in order; the first owner of a key wins.
pub struct UnionObjectResolver {
    delegates: ArcSwap<Vec<Arc<dyn ObjectResolver>>>,
}

impl UnionObjectResolver {
    pub fn new() -> Self {
        Self {
            delegates: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn from_resolvers(resolvers: Vec<Arc<dyn ObjectResolver>>) -> Self {
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

impl Default for UnionObjectResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectResolver for UnionObjectResolver {
    fn get_object(&self, key: &str, content: &dyn ContentResolver) -> Option<SettingsObject> {
        let snapshot = self.delegates.load();
        snapshot
            .iter()
            .find_map(|resolver| resolver.get_object(key, content))
    }

    fn set_object(
        &self,
        key: &str,
        content: &dyn ContentResolver,
        value: &SettingsObject,
    ) -> WriteStatus {
        let snapshot = self.delegates.load();
        for resolver in snapshot.iter() {
            if resolver.set_object(key, content, value).is_success() {
                return WriteStatus::Success;
            }
        }
        WriteStatus::NotPossible
    }

    fn add_object_resolver(&self, resolver: Arc<dyn ObjectResolver>) -> Result<(), SettingsError> {
        self.delegates.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&resolver));
            next
        });
        Ok(())
    }

    fn notify_content_has_changed(&self, key: &str) {
        for resolver in self.delegates.load().iter() {
            resolver.notify_content_has_changed(key);
        }
    }
}
