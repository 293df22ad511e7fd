//! Properties object converter.

use std::sync::Arc;

use crate::content::ContentResolver;
use crate::properties::Properties;

use super::{DescriptorObjectResolver, ObjectConverter, SettingsObject};

/// Descriptor identity claimed by [`PropertiesConverter`].
pub const PROPERTIES_RESOLVER_KEY: &str = "properties";

/// Turns properties text into a [`Properties`] object.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesConverter;

pub type PropertiesObjectResolver = DescriptorObjectResolver<PropertiesConverter>;

impl PropertiesObjectResolver {
    pub fn properties() -> Self {
        DescriptorObjectResolver::new(PropertiesConverter)
    }
}

impl ObjectConverter for PropertiesConverter {
    fn identity(&self) -> &str {
        PROPERTIES_RESOLVER_KEY
    }

    fn content_to_object(
        &self,
        _key: &str,
        _descriptor: &Properties,
        content: &[u8],
        _source: &dyn ContentResolver,
    ) -> Option<SettingsObject> {
        Some(Arc::new(Properties::from_bytes(content)))
    }

    fn object_to_content(
        &self,
        key: &str,
        _descriptor: &Properties,
        value: &SettingsObject,
    ) -> Option<Vec<u8>> {
        match value.downcast_ref::<Properties>() {
            Some(props) => Some(props.to_text().into_bytes()),
            None => {
                tracing::warn!(key = %key, "Object is not a properties map");
                None
            }
        }
    }
}
