//! JSON object converter.

use std::sync::Arc;

use crate::content::ContentResolver;
use crate::properties::Properties;

use super::{DescriptorObjectResolver, ObjectConverter, SettingsObject};

/// Descriptor identity claimed by [`JsonConverter`].
pub const JSON_RESOLVER_KEY: &str = "json";

/// Turns JSON content into a [`serde_json::Value`] object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConverter;

/// Descriptor driven resolver producing [`serde_json::Value`] objects.
pub type JsonObjectResolver = DescriptorObjectResolver<JsonConverter>;

impl JsonObjectResolver {
    pub fn json() -> Self {
        DescriptorObjectResolver::new(JsonConverter)
    }
}

impl ObjectConverter for JsonConverter {
    fn identity(&self) -> &str {
        JSON_RESOLVER_KEY
    }

    fn content_to_object(
        &self,
        key: &str,
        _descriptor: &Properties,
        content: &[u8],
        _source: &dyn ContentResolver,
    ) -> Option<SettingsObject> {
        match serde_json::from_slice::<serde_json::Value>(content) {
            Ok(value) => Some(Arc::new(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Content is not valid JSON");
                None
            }
        }
    }

    fn object_to_content(
        &self,
        key: &str,
        _descriptor: &Properties,
        value: &SettingsObject,
    ) -> Option<Vec<u8>> {
        let Some(json) = value.downcast_ref::<serde_json::Value>() else {
            tracing::warn!(key = %key, "Object is not a JSON value");
            return None;
        };
        serde_json::to_vec_pretty(json)
            .inspect_err(|e| tracing::warn!(key = %key, error = %e, "Failed to serialize JSON"))
            .ok()
    }
}
