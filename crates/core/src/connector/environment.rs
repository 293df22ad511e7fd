//! Environment variable connector.

use crate::object::SettingsObject;

use super::{Connector, ConnectorBase};

/// Reads process environment variables.
///
/// A key is looked up verbatim first, then as its upper-cased form with every
/// non-word character replaced by `_` (`com/acme/db-url` becomes
/// `COM_ACME_DB_URL`). Values are references for content and object lookups.
pub struct EnvironmentConnector {
    base: ConnectorBase,
}

/// The upper-cased, underscore separated variant of `key`.
pub fn environment_fallback_key(key: &str) -> String {
    key.to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

impl EnvironmentConnector {
    pub const KIND: &'static str = "environment";

    pub fn new(name: &str) -> Self {
        Self {
            base: ConnectorBase::new(name),
        }
    }

    fn read_var(key: &str) -> Option<String> {
        if key.is_empty() || key.contains(['=', '\0']) {
            return None;
        }
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Environment value is not valid unicode");
                None
            }
        }
    }
}

impl Connector for EnvironmentConnector {
    fn base(&self) -> &ConnectorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConnectorBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn get_string(&self, key: &str) -> Option<String> {
        Self::read_var(key).or_else(|| {
            let fallback = environment_fallback_key(key);
            tracing::debug!(key = %fallback, "Trying upper-cased environment key");
            Self::read_var(&fallback)
        })
    }

    fn get_content(&self, key: &str) -> Option<Vec<u8>> {
        let reference = self.get_string(key)?;
        self.base.content_by_reference(&reference)
    }

    fn get_object(&self, key: &str) -> Option<SettingsObject> {
        let reference = self.get_string(key)?;
        self.base.object_by_reference(&reference)
    }
}
