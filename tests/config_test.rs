use refmark::config::{get_config_path, load_config, save_config, RefmarkConfig};
use refmark::types::ReferenceKind;
use tempfile::TempDir;

#[test]
fn test_default_config_enables_all_kinds() {
    let config = RefmarkConfig::default();

    for kind in ReferenceKind::ALL {
        assert!(
            config.kind_enabled(kind),
            "kind '{}' should be enabled by default",
            kind.as_str()
        );
    }
}

#[test]
fn test_load_missing_config_returns_default() {
    let dir = TempDir::new().expect("failed to create temp dir");

    let config = load_config(dir.path()).expect("load should not fail");
    assert_eq!(config.version, 1);
    assert_eq!(config.root_dir, dir.path().to_string_lossy().to_string());
    assert_eq!(config.enabled_kinds.len(), ReferenceKind::ALL.len());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().expect("failed to create temp dir");

    let config = RefmarkConfig {
        version: 1,
        root_dir: dir.path().to_string_lossy().to_string(),
        enabled_kinds: vec!["issue".to_string(), "commit".to_string()],
    };
    save_config(dir.path(), &config).expect("save should succeed");

    assert!(get_config_path(dir.path()).exists());

    let loaded = load_config(dir.path()).expect("load should succeed");
    assert_eq!(loaded, config);
}

#[test]
fn test_kind_enabled_for_subset() {
    let config = RefmarkConfig {
        enabled_kinds: vec!["issue".to_string()],
        ..RefmarkConfig::default()
    };

    assert!(config.kind_enabled(ReferenceKind::Issue));
    assert!(!config.kind_enabled(ReferenceKind::Label));
    assert!(!config.kind_enabled(ReferenceKind::User));
}

#[test]
fn test_corrupt_config_is_rejected() {
    let dir = TempDir::new().expect("failed to create temp dir");
    save_config(dir.path(), &RefmarkConfig::default()).expect("save should succeed");

    std::fs::write(get_config_path(dir.path()), "{broken").expect("write should succeed");

    assert!(load_config(dir.path()).is_err());
}
