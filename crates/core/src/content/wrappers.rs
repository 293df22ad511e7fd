//! Filtered and read-only content resolver wrappers.

use std::sync::Arc;

use crate::error::{SettingsError, WriteStatus};
use crate::filter::Filter;

use super::ContentResolver;

/// Hides keys rejected by a filter, as if the wrapped resolver were absent.
pub struct FilteredContentResolver {
    target: Arc<dyn ContentResolver>,
    filter: Arc<dyn Filter>,
}

impl FilteredContentResolver {
    pub fn new(target: Arc<dyn ContentResolver>, filter: Arc<dyn Filter>) -> Self {
        Self { target, filter }
    }
}

impl ContentResolver for FilteredContentResolver {
    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        if !self.filter.is_valid(key) {
            return None;
        }
        self.target.get_content(key)
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        if !self.filter.is_valid(key) {
            return WriteStatus::NotPossible;
        }
        self.target.set_content(key, value)
    }

    fn add_content_resolver(&self, resolver: Arc<dyn ContentResolver>) -> Result<(), SettingsError> {
        self.target.add_content_resolver(resolver)
    }
}

/// Passes reads through and refuses every write.
pub struct ReadOnlyContentResolver {
    target: Arc<dyn ContentResolver>,
}

impl ReadOnlyContentResolver {
    pub fn new(target: Arc<dyn ContentResolver>) -> Self {
        Self { target }
    }
}

impl ContentResolver for ReadOnlyContentResolver {
    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        self.target.get_content(key)
    }

    fn set_content(&self, _key: &str, _value: &[u8]) -> WriteStatus {
        WriteStatus::NotPossible
    }

    fn add_content_resolver(&self, resolver: Arc<dyn ContentResolver>) -> Result<(), SettingsError> {
        self.target.add_content_resolver(resolver)
    }
}
