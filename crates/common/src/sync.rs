//! Cookie sync descriptors.

use crate::types::{GdprConsent, SyncOptions, UserSync, UserSyncKind};

/// Build the consent suffix appended to the sync URL.
///
/// Returns an empty string unless a consent string is available. The `gdpr`
/// flag is only added when the host knows whether GDPR applies.
#[must_use]
pub fn consent_query(gdpr_consent: Option<&GdprConsent>) -> String {
    let Some(consent) = gdpr_consent else {
        return String::new();
    };
    let Some(consent_string) = consent.consent_string.as_deref() else {
        return String::new();
    };

    let encoded = urlencoding::encode(consent_string);
    match consent.gdpr_applies {
        Some(applies) => format!("&gdpr={}&gdpr_consent={encoded}", u8::from(applies)),
        None => format!("&gdpr_consent={encoded}"),
    }
}

/// Pick the sync mechanism and build its URL.
///
/// Iframe wins over pixel when both are allowed. At most one descriptor is
/// returned per call.
#[must_use]
pub fn user_sync(
    sync_endpoint: &str,
    sync_options: &SyncOptions,
    gdpr_consent: Option<&GdprConsent>,
) -> Option<UserSync> {
    let (kind, type_param) = if sync_options.iframe_enabled {
        (UserSyncKind::Iframe, "iframe")
    } else if sync_options.pixel_enabled {
        (UserSyncKind::Image, "pixel")
    } else {
        log::debug!("Mediasquare: no user sync allowed by host");
        return None;
    };

    Some(UserSync {
        kind,
        url: format!(
            "{sync_endpoint}?type={type_param}{}",
            consent_query(gdpr_consent)
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNC_ENDPOINT: &str = "https://bidder.mediasquare.fr/cookie_sync";

    fn consent(consent_string: Option<&str>, gdpr_applies: Option<bool>) -> GdprConsent {
        GdprConsent {
            consent_string: consent_string.map(str::to_string),
            gdpr_applies,
        }
    }

    #[test]
    fn test_consent_query_with_gdpr_applies() {
        let query = consent_query(Some(&consent(Some("abc"), Some(true))));
        assert_eq!(query, "&gdpr=1&gdpr_consent=abc");

        let query = consent_query(Some(&consent(Some("abc"), Some(false))));
        assert_eq!(query, "&gdpr=0&gdpr_consent=abc");
    }

    #[test]
    fn test_consent_query_without_gdpr_applies() {
        let query = consent_query(Some(&consent(Some("abc"), None)));
        assert_eq!(query, "&gdpr_consent=abc");
    }

    #[test]
    fn test_consent_query_without_consent_string() {
        assert_eq!(consent_query(None), "");
        assert_eq!(consent_query(Some(&consent(None, Some(true)))), "");
    }

    #[test]
    fn test_consent_query_encodes_reserved_characters() {
        let query = consent_query(Some(&consent(Some("BOJ/P2HOJ+A=="), None)));
        assert_eq!(query, "&gdpr_consent=BOJ%2FP2HOJ%2BA%3D%3D");
    }

    #[test]
    fn test_iframe_takes_precedence() {
        let options = SyncOptions {
            iframe_enabled: true,
            pixel_enabled: true,
        };

        let sync = user_sync(SYNC_ENDPOINT, &options, None).expect("should return a sync");
        assert_eq!(sync.kind, UserSyncKind::Iframe);
        assert_eq!(
            sync.url,
            "https://bidder.mediasquare.fr/cookie_sync?type=iframe"
        );
    }

    #[test]
    fn test_pixel_when_iframe_disabled() {
        let options = SyncOptions {
            iframe_enabled: false,
            pixel_enabled: true,
        };

        let sync = user_sync(
            SYNC_ENDPOINT,
            &options,
            Some(&consent(Some("abc"), Some(true))),
        )
        .expect("should return a sync");
        assert_eq!(sync.kind, UserSyncKind::Image);
        assert_eq!(
            sync.url,
            "https://bidder.mediasquare.fr/cookie_sync?type=pixel&gdpr=1&gdpr_consent=abc"
        );
    }

    #[test]
    fn test_no_sync_when_nothing_enabled() {
        let options = SyncOptions::default();
        assert_eq!(
            user_sync(SYNC_ENDPOINT, &options, Some(&consent(Some("abc"), None))),
            None
        );
    }
}
