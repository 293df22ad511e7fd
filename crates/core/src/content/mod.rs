//! Content resolvers: keys to raw bytes.
//!
//! Responsibilities:
//! - Define the [`ContentResolver`] capability.
//! - Provide leaf resolvers for the filesystem and bundled resources, the
//!   [`UnionContentResolver`] combinator, and filtered/read-only wrappers.
//!
//! Does NOT handle:
//! - Interpreting bytes as objects (see `object`).
//!
//! Invariants:
//! - Lookups never fail loudly: backend errors become `None`.
//! - Only union resolvers accept delegates; leaves return
//!   [`SettingsError::NotComposable`].

mod classpath;
mod fs;
mod union;
mod wrappers;

use std::sync::Arc;

use crate::error::{SettingsError, WriteStatus};

pub use classpath::{CLASSPATH_PREFIX, ClasspathContentResolver};
pub use fs::{FILE_PREFIX, FsContentResolver};
pub use union::UnionContentResolver;
pub use wrappers::{FilteredContentResolver, ReadOnlyContentResolver};

/// Resolves a key to raw byte content.
pub trait ContentResolver: Send + Sync {
    fn get_content(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores content for `key`. Read-only backends keep the default.
    fn set_content(&self, _key: &str, _value: &[u8]) -> WriteStatus {
        WriteStatus::NotPossible
    }

    /// Appends a delegate. Only union style resolvers accept delegates.
    fn add_content_resolver(
        &self,
        _resolver: Arc<dyn ContentResolver>,
    ) -> Result<(), SettingsError> {
        Err(SettingsError::NotComposable("content resolver"))
    }
}

impl<T: ContentResolver + ?Sized> ContentResolver for Arc<T> {
    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get_content(key)
    }

    fn set_content(&self, key: &str, value: &[u8]) -> WriteStatus {
        (**self).set_content(key, value)
    }

    fn add_content_resolver(&self, resolver: Arc<dyn ContentResolver>) -> Result<(), SettingsError> {
        (**self).add_content_resolver(resolver)
    }
}

/// A resolver that never finds anything. Used where a connector has no
/// content resolver configured but an object resolver needs a source.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContentResolver;

impl ContentResolver for EmptyContentResolver {
    fn get_content(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }
}
