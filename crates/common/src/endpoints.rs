//! Vendor endpoint resolution.
//!
//! Every endpoint lives under one of two hosts. The host is picked per call
//! from [`AdapterFlags::test_mode`], never cached.

use crate::constants::{ENDPOINT_AUCTION, ENDPOINT_SYNC, ENDPOINT_WINNING};
use crate::settings::{AdapterFlags, MediasquareConfig};

#[derive(Debug, Clone)]
pub struct Endpoints {
    production_host: String,
    test_host: String,
}

impl Endpoints {
    #[must_use]
    pub fn new(config: &MediasquareConfig) -> Self {
        Self {
            production_host: with_trailing_slash(&config.production_host),
            test_host: with_trailing_slash(&config.test_host),
        }
    }

    #[must_use]
    pub fn host(&self, flags: &AdapterFlags) -> &str {
        if flags.test_mode {
            &self.test_host
        } else {
            &self.production_host
        }
    }

    #[must_use]
    pub fn auction_url(&self, flags: &AdapterFlags) -> String {
        format!("{}{}", self.host(flags), ENDPOINT_AUCTION)
    }

    #[must_use]
    pub fn sync_url(&self, flags: &AdapterFlags) -> String {
        format!("{}{}", self.host(flags), ENDPOINT_SYNC)
    }

    #[must_use]
    pub fn winning_url(&self, flags: &AdapterFlags) -> String {
        format!("{}{}", self.host(flags), ENDPOINT_WINNING)
    }
}

fn with_trailing_slash(host: &str) -> String {
    if host.ends_with('/') {
        host.to_string()
    } else {
        format!("{host}/")
    }
}
