//! Winning notification pixel.
//!
//! The pixel is a bare GET with the won bid's details in the query string.
//! It is dispatched through a [`PixelSender`] and never awaited, retried, or
//! checked.

use crate::types::WonBid;

/// Best-effort dispatcher for notification pixels.
///
/// Implementations must return without waiting for the request to complete
/// and must swallow failures.
pub trait PixelSender: Send + Sync {
    fn fire(&self, url: &str);
}

/// Ordered query parameters reported for a won bid.
///
/// Provenance (`bidder`, `code`) comes first, then the fixed allow-list in
/// `cpm, size, mediaType, currency, creativeId, adUnitCode, timeToRespond`
/// order. Absent fields are skipped.
#[must_use]
pub fn winning_params(bid: &WonBid) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();

    if let Some(tag) = &bid.mediasquare {
        if let Some(bidder) = &tag.bidder {
            params.push(("bidder", bidder.clone()));
        }
        if let Some(code) = &tag.code {
            params.push(("code", code.clone()));
        }
    }

    if let Some(cpm) = bid.cpm {
        params.push(("cpm", cpm.to_string()));
    }
    if let Some(size) = &bid.size {
        params.push(("size", size.clone()));
    }
    if let Some(media_type) = &bid.media_type {
        params.push(("mediaType", media_type.clone()));
    }
    if let Some(currency) = &bid.currency {
        params.push(("currency", currency.clone()));
    }
    if let Some(creative_id) = &bid.creative_id {
        params.push(("creativeId", creative_id.clone()));
    }
    if let Some(ad_unit_code) = &bid.ad_unit_code {
        params.push(("adUnitCode", ad_unit_code.clone()));
    }
    if let Some(time_to_respond) = bid.time_to_respond {
        params.push(("timeToRespond", time_to_respond.to_string()));
    }

    params
}

/// Full pixel URL for a won bid. The `?` is only added when there is at
/// least one parameter.
#[must_use]
pub fn winning_url(winning_endpoint: &str, bid: &WonBid) -> String {
    let query = winning_params(bid)
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        winning_endpoint.to_string()
    } else {
        format!("{winning_endpoint}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediasquareTag;

    const WINNING_ENDPOINT: &str = "https://bidder.mediasquare.fr/winning";

    #[test]
    fn test_winning_url_with_provenance_and_partial_fields() {
        let bid = WonBid {
            mediasquare: Some(MediasquareTag {
                bidder: Some("m1".to_string()),
                code: Some("c1".to_string()),
            }),
            cpm: Some(1.5),
            ad_unit_code: Some("div1".to_string()),
            ..WonBid::default()
        };

        assert_eq!(
            winning_url(WINNING_ENDPOINT, &bid),
            "https://bidder.mediasquare.fr/winning?bidder=m1&code=c1&cpm=1.5&adUnitCode=div1"
        );
    }

    #[test]
    fn test_winning_params_follow_allow_list_order() {
        let bid = WonBid {
            mediasquare: None,
            cpm: Some(2.0),
            size: Some("300x250".to_string()),
            media_type: Some("banner".to_string()),
            currency: Some("EUR".to_string()),
            creative_id: Some("crid".to_string()),
            ad_unit_code: Some("banner-div".to_string()),
            time_to_respond: Some(120),
        };

        let keys: Vec<&str> = winning_params(&bid).iter().map(|(key, _)| *key).collect();
        assert_eq!(
            keys,
            vec![
                "cpm",
                "size",
                "mediaType",
                "currency",
                "creativeId",
                "adUnitCode",
                "timeToRespond"
            ]
        );
        assert_eq!(
            winning_url(WINNING_ENDPOINT, &bid),
            "https://bidder.mediasquare.fr/winning?cpm=2&size=300x250&mediaType=banner&currency=EUR&creativeId=crid&adUnitCode=banner-div&timeToRespond=120"
        );
    }

    #[test]
    fn test_partial_provenance_tag() {
        let bid = WonBid {
            mediasquare: Some(MediasquareTag {
                bidder: None,
                code: Some("c1".to_string()),
            }),
            ..WonBid::default()
        };

        assert_eq!(
            winning_url(WINNING_ENDPOINT, &bid),
            "https://bidder.mediasquare.fr/winning?code=c1"
        );
    }

    #[test]
    fn test_empty_bid_has_no_query() {
        assert_eq!(
            winning_url(WINNING_ENDPOINT, &WonBid::default()),
            WINNING_ENDPOINT
        );
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let bid = WonBid {
            mediasquare: Some(MediasquareTag {
                bidder: Some("msqClassic".to_string()),
                code: Some("test/publishername_atf_desktop_rg_pave".to_string()),
            }),
            ..WonBid::default()
        };

        assert_eq!(
            winning_url(WINNING_ENDPOINT, &bid),
            "https://bidder.mediasquare.fr/winning?bidder=msqClassic&code=test%2Fpublishername_atf_desktop_rg_pave"
        );
    }
}
