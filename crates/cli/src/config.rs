//! Configuration commands.
//!
//! Configuration is loaded from TOML files and merged with environment variables
//! prefixed with `MSQ_ADAPTER__`. For example, `MSQ_ADAPTER__MEDIASQUARE__DEBUG`
//! will override `mediasquare.debug` in the TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use msq_adapter_common::settings::Settings;

use crate::error::CliError;

/// Load settings from `file`, or the embedded defaults when no file is given.
pub(crate) fn load_settings(file: Option<&Path>, verbose: bool) -> Result<Settings, CliError> {
    let Some(file) = file else {
        if verbose {
            println!("Using embedded configuration");
        }
        return Settings::new()
            .map_err(|e| CliError::Config(format!("Failed to load embedded config: {:?}", e)));
    };

    let content = fs::read_to_string(file)?;

    if verbose {
        println!("Loading config from: {}", file.display());
        println!("Environment variables with MSQ_ADAPTER__ prefix will be merged");
    }

    Settings::from_toml(&content)
        .map_err(|e| CliError::Config(format!("Failed to parse and merge config: {:?}", e)))
}

/// Validate configuration file.
///
/// Validates TOML syntax and field values after merging environment variables.
pub fn validate(file: PathBuf, verbose: bool) -> Result<(), CliError> {
    let settings = load_settings(Some(&file), verbose)?;
    let merged_toml = settings
        .to_canonical_toml()
        .map_err(|e| CliError::Config(format!("Failed to serialize merged config: {e:?}")))?;

    println!("Configuration is valid");
    println!("  File: {}", file.display());
    println!(
        "  Mediasquare: {}",
        if settings.mediasquare.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Production host: {}", settings.mediasquare.production_host);
    println!("  Test host: {}", settings.mediasquare.test_host);

    if verbose {
        let value: toml::Value = toml::from_str(&merged_toml)
            .map_err(|e| CliError::Config(format!("Merged config is not valid TOML: {e}")))?;
        if let Some(table) = value.as_table() {
            println!("\nSections found:");
            for key in table.keys() {
                println!("  - [{}]", key);
            }
        }

        println!("\nMerged configuration:");
        println!("---");
        print!("{}", merged_toml);
        println!("---");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(dir: &TempDir) -> PathBuf {
        let config_path = dir.path().join("test-config.toml");
        fs::write(
            &config_path,
            r#"
[mediasquare]
enabled = true
production_host = "https://bidder.example.com/"
test_host = "https://bidder-test.example.com/"
"#,
        )
        .expect("should write config");
        config_path
    }

    #[test]
    fn test_validate_valid_config() {
        let dir = TempDir::new().expect("should create temp dir");
        let config_path = create_test_config(&dir);

        assert!(validate(config_path.clone(), false).is_ok());
        assert!(validate(config_path, true).is_ok());
    }

    #[test]
    fn test_validate_invalid_toml() {
        let dir = TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join("invalid.toml");
        fs::write(&config_path, "invalid { toml").expect("should write config");

        assert!(validate(config_path, false).is_err());
    }

    #[test]
    fn test_validate_invalid_host() {
        let dir = TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join("bad-host.toml");
        fs::write(&config_path, "[mediasquare]\ntest_host = \"nope\"\n")
            .expect("should write config");

        let result = validate(config_path, false);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let dir = TempDir::new().expect("should create temp dir");
        let config_path = dir.path().join("nonexistent.toml");

        assert!(matches!(validate(config_path, false), Err(CliError::Io(_))));
    }

    #[test]
    fn test_load_settings_defaults_to_embedded() {
        let settings = load_settings(None, false).expect("embedded config should load");
        assert_eq!(
            settings.mediasquare.production_host,
            "https://bidder.mediasquare.fr/"
        );
    }
}
