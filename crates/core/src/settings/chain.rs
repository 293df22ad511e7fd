//! Ordered chain iteration shared by every settings scope.

use std::sync::Arc;

use crate::connector::Connector;
use crate::error::{SettingsError, WriteStatus};

/// Returns the first non-`None` result of `lookup` across `connectors`.
pub(crate) fn first_found<T>(
    connectors: &[Arc<dyn Connector>],
    key: &str,
    mapped: &str,
    value_kind: &'static str,
    lookup: impl Fn(&dyn Connector, &str) -> Option<T>,
) -> Option<T> {
    connectors.iter().find_map(|connector| {
        let found = lookup(connector.as_ref(), mapped)?;
        tracing::debug!(
            value_kind,
            key = %key,
            connector = %connector.name(),
            connector_kind = connector.kind(),
            "Found value for key"
        );
        Some(found)
    })
}

/// Offers a write to each connector in order until one accepts it.
pub(crate) fn first_written(
    connectors: &[Arc<dyn Connector>],
    key: &str,
    mapped: &str,
    write: impl Fn(&dyn Connector, &str) -> WriteStatus,
) -> Result<(), SettingsError> {
    for connector in connectors {
        if write(connector.as_ref(), mapped).is_success() {
            tracing::debug!(key = %key, connector = %connector.name(), "Value written");
            return Ok(());
        }
    }
    tracing::info!(key = %key, connectors = connectors.len(), "No connector accepted the write");
    Err(SettingsError::NoWritableConnector {
        key: key.to_string(),
    })
}
