//! Adapter settings.
//!
//! Settings come from TOML merged with environment variables prefixed with
//! `MSQ_ADAPTER__`. For example `MSQ_ADAPTER__MEDIASQUARE__DEBUG=true`
//! overrides `mediasquare.debug`.

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::error::AdapterError;

pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "MSQ_ADAPTER";
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct MediasquareConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the production bidder, including the trailing slash.
    #[serde(default = "default_production_host")]
    #[validate(url)]
    pub production_host: String,

    /// Base URL of the test bidder, used when the page opts into test mode.
    #[serde(default = "default_test_host")]
    #[validate(url)]
    pub test_host: String,

    /// Query string marker that switches a page into test mode.
    #[serde(default = "default_test_marker")]
    #[validate(length(min = 1))]
    pub test_marker: String,

    /// Ask the vendor for a debug auction.
    #[serde(default)]
    pub debug: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_production_host() -> String {
    "https://bidder.mediasquare.fr/".to_string()
}

fn default_test_host() -> String {
    "https://bidder-test.mediasquare.fr/".to_string()
}

fn default_test_marker() -> String {
    "msq_test=true".to_string()
}

impl Default for MediasquareConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            production_host: default_production_host(),
            test_host: default_test_host(),
            test_marker: default_test_marker(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub mediasquare: MediasquareConfig,
}

impl Settings {
    /// Load the settings embedded at build time, merged with the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged configuration cannot be deserialized or
    /// fails validation.
    pub fn new() -> Result<Self, Report<AdapterError>> {
        let toml_str = include_str!("../../../mediasquare.toml");
        Self::from_toml(toml_str)
    }

    /// Parse settings from a TOML string, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, a value has the wrong type,
    /// or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<AdapterError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_VARIABLE_PREFIX)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let settings: Self = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(AdapterError::Configuration {
                message: "Failed to build configuration".to_string(),
            })?
            .try_deserialize()
            .change_context(AdapterError::Configuration {
                message: "Failed to deserialize configuration".to_string(),
            })?;

        settings
            .validate()
            .change_context(AdapterError::Configuration {
                message: "Settings validation failed".to_string(),
            })?;

        Ok(settings)
    }

    /// Serialize the effective settings back to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be represented as TOML.
    pub fn to_canonical_toml(&self) -> Result<String, Report<AdapterError>> {
        toml::to_string(self).change_context(AdapterError::Configuration {
            message: "Failed to serialize settings to TOML".to_string(),
        })
    }
}

/// Per-call switches that used to be read from ambient page and global state.
///
/// The host builds these once per page view and passes them to every adapter
/// call; the adapter never caches them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterFlags {
    /// Route every endpoint to the test bidder.
    pub test_mode: bool,
    /// Add `debug: true` to the auction payload.
    pub debug: bool,
}

impl AdapterFlags {
    #[must_use]
    pub fn new(test_mode: bool, debug: bool) -> Self {
        Self { test_mode, debug }
    }

    /// Derive flags from the page URL the auction runs on.
    ///
    /// Test mode is on when the query string contains the configured marker.
    /// Unparseable URLs fall back to production.
    #[must_use]
    pub fn from_page_url(config: &MediasquareConfig, page_url: Option<&str>) -> Self {
        let test_mode = page_url
            .and_then(|raw| match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    log::debug!("Mediasquare: ignoring unparseable page URL '{raw}': {e}");
                    None
                }
            })
            .and_then(|url| url.query().map(|query| query.contains(&config.test_marker)))
            .unwrap_or(false);

        Self {
            test_mode,
            debug: config.debug,
        }
    }
}
