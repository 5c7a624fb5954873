//! Loading configuration files and building the loop from them

use seolens_core::{ConfigError, OptimizationLoop, ProviderKind, SeolensConfig};
use std::io::Write;

fn write_config(raw: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(raw.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_file_and_build_loop() {
    let file = write_config(
        r#"{
            "optimizer": {"min_score_threshold": 80, "optimization_cycles_limit": 5},
            "autofix": {"default_lang": "en"}
        }"#,
    );
    let config = SeolensConfig::from_file(file.path()).unwrap();

    assert_eq!(config.optimizer.min_score_threshold(), 80);
    assert_eq!(config.optimizer.optimization_cycles_limit(), 5);
    // untouched keys keep their defaults
    assert_eq!(config.optimizer.ai_suggestions_threshold(), 60);
    assert_eq!(config.autofix.default_lang, "en");
    assert_eq!(config.improver.provider, ProviderKind::Disabled);

    let optimizer = OptimizationLoop::from_config(&config).unwrap();
    assert_eq!(optimizer.config().min_score_threshold(), 80);
    assert!(optimizer.registry().is_empty());
}

#[test]
fn test_negative_cycle_limit_in_file() {
    let file = write_config(r#"{"optimizer": {"optimization_cycles_limit": -1}}"#);
    let err = SeolensConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("optimization_cycles_limit"), "{err}");
}

#[test]
fn test_bad_default_lang_in_file() {
    let file = write_config(r#"{"autofix": {"default_lang": "not a tag!"}}"#);
    assert!(matches!(
        SeolensConfig::from_file(file.path()),
        Err(ConfigError::Invalid { field: "default_lang", .. })
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = SeolensConfig::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
