//! Where a connector is inserted into an ordered chain.

use std::sync::Arc;

use crate::error::SettingsError;

use super::Connector;

/// Insertion point for a connector, resolved against the current chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorPosition {
    AtFirst,
    AtLast,
    /// Directly before the connector with this name.
    Before(String),
    /// Directly after the connector with this name.
    After(String),
    /// Before the first connector of this kind.
    BeforeFirst(String),
    /// Before the last connector of this kind.
    BeforeLast(String),
    /// After the first connector of this kind.
    AfterFirst(String),
    /// After the last connector of this kind.
    AfterLast(String),
    /// The first alternative that resolves.
    FirstValid(Vec<ConnectorPosition>),
}

impl ConnectorPosition {
    /// Index to insert at, or `None` if the anchor is missing.
    pub fn index_in(&self, connectors: &[Arc<dyn Connector>]) -> Option<usize> {
        let by_name = |name: &str| connectors.iter().position(|c| c.name() == name);
        let first_kind = |kind: &str| connectors.iter().position(|c| c.kind() == kind);
        let last_kind = |kind: &str| connectors.iter().rposition(|c| c.kind() == kind);

        match self {
            ConnectorPosition::AtFirst => Some(0),
            ConnectorPosition::AtLast => Some(connectors.len()),
            ConnectorPosition::Before(name) => by_name(name),
            ConnectorPosition::After(name) => by_name(name).map(|idx| idx + 1),
            ConnectorPosition::BeforeFirst(kind) => first_kind(kind),
            ConnectorPosition::BeforeLast(kind) => last_kind(kind),
            ConnectorPosition::AfterFirst(kind) => first_kind(kind).map(|idx| idx + 1),
            ConnectorPosition::AfterLast(kind) => last_kind(kind).map(|idx| idx + 1),
            ConnectorPosition::FirstValid(candidates) => {
                candidates.iter().find_map(|candidate| candidate.index_in(connectors))
            }
        }
    }
}

/// Inserts `connector` into `connectors` at `position`.
///
/// Fails if the name is already taken or the position does not resolve.
pub fn insert_at_position(
    connectors: &mut Vec<Arc<dyn Connector>>,
    connector: Arc<dyn Connector>,
    position: &ConnectorPosition,
) -> Result<(), SettingsError> {
    if connectors.iter().any(|c| c.name() == connector.name()) {
        return Err(SettingsError::DuplicateConnector(connector.name().to_string()));
    }
    let index = position
        .index_in(connectors)
        .ok_or_else(|| SettingsError::NoValidPosition(connector.name().to_string()))?;
    connectors.insert(index, connector);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingConnector;

    fn chain(entries: &[(&str, &'static str)]) -> Vec<Arc<dyn Connector>> {
        entries
            .iter()
            .map(|(name, kind)| {
                Arc::new(CountingConnector::new(name).with_kind(*kind)) as Arc<dyn Connector>
            })
            .collect()
    }

    fn names(connectors: &[Arc<dyn Connector>]) -> Vec<&str> {
        connectors.iter().map(|c| c.name()).collect()
    }

    fn connector(name: &str) -> Arc<dyn Connector> {
        Arc::new(CountingConnector::new(name))
    }

    #[test]
    fn test_first_and_last() {
        let mut list = chain(&[("a", "x")]);
        insert_at_position(&mut list, connector("first"), &ConnectorPosition::AtFirst).unwrap();
        insert_at_position(&mut list, connector("last"), &ConnectorPosition::AtLast).unwrap();
        assert_eq!(names(&list), vec!["first", "a", "last"]);
    }

    #[test]
    fn test_before_and_after_name() {
        let mut list = chain(&[("a", "x"), ("b", "x")]);
        insert_at_position(&mut list, connector("c"), &ConnectorPosition::After("a".into())).unwrap();
        insert_at_position(&mut list, connector("d"), &ConnectorPosition::Before("a".into())).unwrap();
        assert_eq!(names(&list), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_kind_positions() {
        let base = chain(&[("a", "fs"), ("b", "env"), ("c", "fs")]);

        assert_eq!(ConnectorPosition::BeforeFirst("fs".into()).index_in(&base), Some(0));
        assert_eq!(ConnectorPosition::BeforeLast("fs".into()).index_in(&base), Some(2));
        assert_eq!(ConnectorPosition::AfterFirst("fs".into()).index_in(&base), Some(1));
        assert_eq!(ConnectorPosition::AfterLast("fs".into()).index_in(&base), Some(3));
        assert_eq!(ConnectorPosition::AfterLast("naming".into()).index_in(&base), None);
    }

    #[test]
    fn test_first_valid_falls_through() {
        let base = chain(&[("a", "fs")]);
        let position = ConnectorPosition::FirstValid(vec![
            ConnectorPosition::After("missing".into()),
            ConnectorPosition::BeforeFirst("fs".into()),
        ]);
        assert_eq!(position.index_in(&base), Some(0));
    }

    #[test]
    fn test_unknown_position_and_duplicate_name() {
        let mut list = chain(&[("a", "fs")]);
        let err = insert_at_position(&mut list, connector("b"), &ConnectorPosition::Before("zzz".into()))
            .unwrap_err();
        assert!(matches!(err, SettingsError::NoValidPosition(name) if name == "b"));

        let err = insert_at_position(&mut list, connector("a"), &ConnectorPosition::AtLast).unwrap_err();
        assert!(matches!(err, SettingsError::DuplicateConnector(name) if name == "a"));
        assert_eq!(names(&list), vec!["a"]);
    }
}
