//! Filtered and read-only object resolver wrappers.

use std::sync::Arc;

use crate::content::ContentResolver;
use crate::error::{SettingsError, WriteStatus};
use crate::filter::Filter;

use super::{ObjectResolver, SettingsObject};

/// Hides keys rejected by a filter.
pub struct FilteredObjectResolver {
    target: Arc<dyn ObjectResolver>,
    filter: Arc<dyn Filter>,
}

impl FilteredObjectResolver {
    pub fn new(target: Arc<dyn ObjectResolver>, filter: Arc<dyn Filter>) -> Self {
        Self { target, filter }
    }
}

impl ObjectResolver for FilteredObjectResolver {
    fn get_object(&self, key: &str, content: &dyn ContentResolver) -> Option<SettingsObject> {
        if !self.filter.is_valid(key) {
            return None;
        }
        self.target.get_object(key, content)
    }

    fn set_object(
        &self,
        key: &str,
        content: &dyn ContentResolver,
        value: &SettingsObject,
    ) -> WriteStatus {
        if !self.filter.is_valid(key) {
            return WriteStatus::NotPossible;
        }
        self.target.set_object(key, content, value)
    }

    fn add_object_resolver(&self, resolver: Arc<dyn ObjectResolver>) -> Result<(), SettingsError> {
        self.target.add_object_resolver(resolver)
    }

    fn notify_content_has_changed(&self, key: &str) {
        if self.filter.is_valid(key) {
            self.target.notify_content_has_changed(key);
        }
    }
}

/// Passes reads and notifications through and refuses every write.
pub struct ReadOnlyObjectResolver {
    target: Arc<dyn ObjectResolver>,
}

impl ReadOnlyObjectResolver {
    pub fn new(target: Arc<dyn ObjectResolver>) -> Self {
        Self { target }
    }
}

impl ObjectResolver for ReadOnlyObjectResolver {
    fn get_object(&self, key: &str, content: &dyn ContentResolver) -> Option<SettingsObject> {
        self.target.get_object(key, content)
    }

    fn add_object_resolver(&self, resolver: Arc<dyn ObjectResolver>) -> Result<(), SettingsError> {
        self.target.add_object_resolver(resolver)
    }

    fn notify_content_has_changed(&self, key: &str) {
        self.target.notify_content_has_changed(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::EmptyContentResolver;
    use crate::filter::PatternFilter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl ObjectResolver for Counting {
        fn get_object(&self, _key: &str, _content: &dyn ContentResolver) -> Option<SettingsObject> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(()))
        }

        fn set_object(
            &self,
            _key: &str,
            _content: &dyn ContentResolver,
            _value: &SettingsObject,
        ) -> WriteStatus {
            self.calls.fetch_add(1, Ordering::SeqCst);
            WriteStatus::Success
        }
    }

    #[test]
    fn test_filtered_object_resolver() {
        let target = Arc::new(Counting::default());
        let filter = PatternFilter::from_patterns(["allowed/.*"], Vec::<&str>::new()).unwrap();
        let filtered = FilteredObjectResolver::new(target.clone(), Arc::new(filter));
        let value: SettingsObject = Arc::new(());

        assert!(filtered.get_object("denied/x", &EmptyContentResolver).is_none());
        assert_eq!(
            filtered.set_object("denied/x", &EmptyContentResolver, &value),
            WriteStatus::NotPossible
        );
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);

        assert!(filtered.get_object("allowed/x", &EmptyContentResolver).is_some());
        assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_only_object_resolver() {
        let target = Arc::new(Counting::default());
        let read_only = ReadOnlyObjectResolver::new(target.clone());
        let value: SettingsObject = Arc::new(());

        assert_eq!(
            read_only.set_object("k", &EmptyContentResolver, &value),
            WriteStatus::NotPossible
        );
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
        assert!(read_only.get_object("k", &EmptyContentResolver).is_some());
    }
}
