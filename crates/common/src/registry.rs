//! Bidder registry keyed by bidder code and aliases.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{register_adapter, BidAdapter};
use crate::settings::Settings;

/// Lookup table from bidder code (or alias) to adapter.
#[derive(Default)]
pub struct BidderRegistry {
    adapters: HashMap<&'static str, Arc<dyn BidAdapter>>,
}

impl BidderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every adapter enabled in settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::new();
        if let Some(adapter) = register_adapter(settings) {
            registry.register(adapter);
        }
        log::info!("Bidder registry built with {} codes", registry.len());
        registry
    }

    /// Register an adapter under its code and every alias.
    ///
    /// Codes already taken keep their first adapter.
    pub fn register(&mut self, adapter: Arc<dyn BidAdapter>) {
        let codes = std::iter::once(adapter.code()).chain(adapter.aliases().iter().copied());
        for code in codes {
            if self.adapters.contains_key(code) {
                log::warn!("Bidder code '{code}' is already registered, ignoring duplicate");
                continue;
            }
            self.adapters.insert(code, Arc::clone(&adapter));
        }
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<Arc<dyn BidAdapter>> {
        self.adapters.get(code).cloned()
    }

    /// Registered codes, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        let mut codes: Vec<&'static str> = self.adapters.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MediasquareAdapter;
    use crate::settings::MediasquareConfig;
    use crate::test_support::tests::create_test_settings;

    #[test]
    fn test_registry_indexes_code_and_aliases() {
        let registry = BidderRegistry::from_settings(&create_test_settings());

        assert_eq!(registry.codes(), vec!["mediasquare", "msq"]);
        let by_code = registry.get("mediasquare").expect("code registered");
        let by_alias = registry.get("msq").expect("alias registered");
        assert!(Arc::ptr_eq(&by_code, &by_alias));
        assert!(registry.get("appnexus").is_none());
    }

    #[test]
    fn test_registry_keeps_first_registration() {
        let mut registry = BidderRegistry::new();
        let first: Arc<dyn BidAdapter> =
            Arc::new(MediasquareAdapter::new(&MediasquareConfig::default()));
        let second: Arc<dyn BidAdapter> =
            Arc::new(MediasquareAdapter::new(&MediasquareConfig::default()));

        registry.register(Arc::clone(&first));
        registry.register(second);

        assert_eq!(registry.len(), 2);
        let registered = registry.get("mediasquare").expect("code registered");
        assert!(Arc::ptr_eq(&registered, &first));
    }

    #[test]
    fn test_registry_empty_when_disabled() {
        let mut settings = create_test_settings();
        settings.mediasquare.enabled = false;

        let registry = BidderRegistry::from_settings(&settings);
        assert!(registry.is_empty());
    }
}
