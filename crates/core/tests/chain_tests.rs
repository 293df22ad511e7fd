//! Integration tests for connector chains behind a settings scope.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use settings_core::connector::{FsConnector, SystemProperties, SystemPropertyConnector};
use settings_core::testing::CountingConnector;
use settings_core::{
    Connector, DecoratedConnector, PatternFilter, Settings, SettingsError, SettingsInstance,
    SettingsRepository, WriteStatus,
};
use tempfile::TempDir;

fn read_only_system_properties(properties: Arc<SystemProperties>) -> Arc<dyn Connector> {
    let connector = SystemPropertyConnector::with_properties("SystemProperty", properties);
    Arc::new(DecoratedConnector::wrap(Box::new(connector)).read_only())
}

#[test]
fn test_system_property_then_filesystem_scenario() {
    let dir = TempDir::new().unwrap();
    let repo = SettingsRepository::new();
    let root = repo.root_settings();
    root.add_connector(read_only_system_properties(Arc::new(SystemProperties::new())))
        .unwrap();
    root.add_connector(Arc::new(FsConnector::with_root("FileSystem", dir.path())))
        .unwrap();

    assert_eq!(root.get_string("xyz"), None);

    std::fs::write(dir.path().join("xyz"), "abc").unwrap();
    assert_eq!(root.get_string("xyz"), Some("abc".to_string()));

    root.set_string("xyz", "def").unwrap();
    assert_eq!(root.get_string("xyz"), Some("def".to_string()));
    assert_eq!(std::fs::read_to_string(dir.path().join("xyz")).unwrap(), "def");
}

#[test]
fn test_system_property_shadows_filesystem() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("xyz"), "from-file").unwrap();
    let properties = Arc::new(SystemProperties::new());
    properties.set("xyz", "from-property");

    let settings = SettingsInstance::new("flat");
    settings
        .add_connector(read_only_system_properties(properties.clone()))
        .unwrap();
    settings
        .add_connector(Arc::new(FsConnector::with_root("FileSystem", dir.path())))
        .unwrap();

    assert_eq!(settings.get_string("xyz"), Some("from-property".to_string()));
    properties.remove("xyz");
    assert_eq!(settings.get_string("xyz"), Some("from-file".to_string()));
}

#[test]
fn test_read_only_chain_write_names_the_key() {
    let settings = SettingsInstance::new("flat");
    let inner = CountingConnector::new("memory");
    let calls = inner.calls();
    settings
        .add_connector(Arc::new(DecoratedConnector::wrap(Box::new(inner)).read_only()))
        .unwrap();

    let err = settings.set_string("com/acme/app/param", "v").unwrap_err();
    match err {
        SettingsError::NoWritableConnector { key } => assert_eq!(key, "com/acme/app/param"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(calls.writes.load(Ordering::SeqCst), 0);
}

#[test]
fn test_empty_chain_reads_none_and_refuses_writes() {
    let settings = SettingsInstance::new("empty");
    assert_eq!(settings.get_string("k"), None);
    assert_eq!(settings.get_content("k"), None);
    assert!(settings.get_object("k").is_none());
    assert!(settings.set_content("k", b"v").is_err());
}

#[test]
fn test_cached_connector_calls_backend_once_per_generation() {
    let inner = CountingConnector::new("memory").with_string("k", "v");
    let calls = inner.calls();
    let cached = Arc::new(DecoratedConnector::wrap(Box::new(inner)).cached());

    let settings = SettingsInstance::new("flat");
    settings.add_connector(cached.clone()).unwrap();

    for _ in 0..5 {
        assert_eq!(settings.get_string("k"), Some("v".to_string()));
        assert_eq!(settings.get_string("absent"), None);
    }
    assert_eq!(calls.string_reads.load(Ordering::SeqCst), 2);

    cached.clear_cached_value("k");
    assert_eq!(settings.get_string("k"), Some("v".to_string()));
    assert_eq!(settings.get_string("k"), Some("v".to_string()));
    assert_eq!(calls.string_reads.load(Ordering::SeqCst), 3);

    cached.notify_content_has_changed("absent");
    assert_eq!(settings.get_string("absent"), None);
    assert_eq!(calls.string_reads.load(Ordering::SeqCst), 4);
}

#[test]
fn test_write_through_cached_connector_is_visible() {
    let inner = CountingConnector::new("memory").with_string("k", "old");
    let settings = SettingsInstance::new("flat");
    settings
        .add_connector(Arc::new(DecoratedConnector::wrap(Box::new(inner)).cached()))
        .unwrap();

    assert_eq!(settings.get_string("k"), Some("old".to_string()));
    settings.set_string("k", "new").unwrap();
    assert_eq!(settings.get_string("k"), Some("new".to_string()));
}

#[test]
fn test_filtered_connector_is_skipped_per_key() {
    let hidden = CountingConnector::new("filtered")
        .with_string("public/a", "filtered-a")
        .with_string("secret/b", "filtered-b");
    let hidden_calls = hidden.calls();
    let filter = PatternFilter::from_patterns(Vec::<&str>::new(), ["secret/.*"]).unwrap();

    let settings = SettingsInstance::new("flat");
    settings
        .add_connector(Arc::new(
            DecoratedConnector::wrap(Box::new(hidden)).filtered(Arc::new(filter)),
        ))
        .unwrap();
    settings
        .add_connector(Arc::new(
            CountingConnector::new("fallback").with_string("secret/b", "fallback-b"),
        ))
        .unwrap();

    assert_eq!(settings.get_string("public/a"), Some("filtered-a".to_string()));
    let reads_before = hidden_calls.reads();
    assert_eq!(settings.get_string("secret/b"), Some("fallback-b".to_string()));
    assert_eq!(hidden_calls.reads(), reads_before);
}

#[test]
fn test_layers_compose_in_order() {
    let inner = CountingConnector::new("memory").with_string("k", "v");
    let calls = inner.calls();
    let filter = PatternFilter::from_patterns(["k"], Vec::<&str>::new()).unwrap();
    let connector = DecoratedConnector::wrap(Box::new(inner))
        .filtered(Arc::new(filter))
        .cached()
        .read_only();

    assert_eq!(connector.get_string("k"), Some("v".to_string()));
    assert_eq!(connector.get_string("k"), Some("v".to_string()));
    assert_eq!(connector.get_string("other"), None);
    assert_eq!(calls.string_reads.load(Ordering::SeqCst), 1);
    assert_eq!(connector.set_string("k", "x"), WriteStatus::NotPossible);
    assert_eq!(calls.writes.load(Ordering::SeqCst), 0);
}
