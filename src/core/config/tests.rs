use super::data::{Config, GenerationSettings, Persona, DEFAULT_BASE_URL};
use super::io::ConfigError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config.model, None);
    assert!(config.personas.is_empty());
    assert_eq!(config.generation_settings(), GenerationSettings::default());
    assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    assert_eq!(config.data_dir(), PathBuf::from("."));
}

#[test]
fn test_load_full_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
model = "gemini-2.5-flash"
temperature = 0.7
thinking_budget = 512
include_thoughts = false
default_persona = "coder"
data_dir = "/var/lib/parley"

[[personas]]
name = "pirate"
system_instruction = "Talk like a pirate."
"#,
    )
    .expect("Failed to write config");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");
    let settings = config.generation_settings();

    assert_eq!(settings.model, "gemini-2.5-flash");
    assert_eq!(settings.temperature, 0.7);
    assert_eq!(settings.thinking_budget, 512);
    assert!(!settings.include_thoughts);
    assert_eq!(config.default_persona.as_deref(), Some("coder"));
    assert_eq!(config.data_dir(), PathBuf::from("/var/lib/parley"));
    assert_eq!(
        config.personas,
        vec![Persona {
            name: "pirate".to_string(),
            system_instruction: "Talk like a pirate.".to_string(),
        }]
    );
}

#[test]
fn test_partial_config_keeps_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "temperature = 1.0\n").expect("Failed to write config");

    let settings = Config::load_from_path(&config_path)
        .expect("Failed to load config")
        .generation_settings();

    assert_eq!(settings.temperature, 1.0);
    assert_eq!(settings.model, GenerationSettings::default().model);
    assert!(settings.include_thoughts);
}

#[test]
fn test_invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("broken.toml");
    std::fs::write(&config_path, "model = [unclosed").expect("Failed to write config");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_explicit_path_takes_precedence() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("explicit.toml");
    std::fs::write(&config_path, "model = \"explicit-model\"\n").expect("Failed to write config");

    let config = Config::load(Some(&config_path)).expect("Failed to load config");
    assert_eq!(config.model.as_deref(), Some("explicit-model"));
}
