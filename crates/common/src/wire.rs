//! Mediasquare bidder wire format.

use serde::{Deserialize, Serialize};

use crate::types::{lenient_f64, lenient_option, lenient_string, lenient_u32, MediaTypes};

// ============================================================================
// Auction request
// ============================================================================

/// One entry per ad unit in the auction payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Ad unit code of the slot
    pub adunit: String,

    #[serde(rename = "bidId")]
    pub bid_id: String,

    #[serde(rename = "auctionId")]
    pub auction_id: String,

    #[serde(rename = "transactionId", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    pub mediatypes: MediaTypes,
}

/// Consent block forwarded to the bidder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GdprPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent_required: Option<bool>,
}

/// Body of the POST to the auction endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundPayload {
    pub codes: Vec<CodeEntry>,

    /// Percent-encoded page URL
    pub referer: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<GdprPayload>,

    /// Only ever `Some(true)`; omitted otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

// ============================================================================
// Auction response
// ============================================================================

/// A single bid returned by the bidder.
///
/// Every field is optional and read leniently: numbers may arrive as
/// strings, integers as integral floats, and a value of the wrong type is
/// treated as absent rather than rejecting the bid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VendorBid {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bid_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpm: Option<f64>,

    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<u32>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub creative_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub net_revenue: Option<bool>,

    /// Time to live in seconds
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl: Option<u32>,

    /// Creative markup
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub ad: Option<String>,

    /// Mediasquare internal bidder that won the slot
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bidder: Option<String>,

    /// Mediasquare placement code
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub deal_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_omits_absent_optionals() {
        let payload = OutboundPayload {
            codes: vec![CodeEntry {
                owner: Some("test".to_string()),
                code: None,
                adunit: "banner-div".to_string(),
                bid_id: "aaaa1234".to_string(),
                auction_id: "bbbb1234".to_string(),
                transaction_id: None,
                mediatypes: MediaTypes::default(),
            }],
            referer: "https%3A%2F%2Fexample.com".to_string(),
            gdpr: None,
            debug: None,
        };

        assert_eq!(
            serde_json::to_value(&payload).expect("should serialize"),
            json!({
                "codes": [{
                    "owner": "test",
                    "adunit": "banner-div",
                    "bidId": "aaaa1234",
                    "auctionId": "bbbb1234",
                    "mediatypes": {}
                }],
                "referer": "https%3A%2F%2Fexample.com"
            })
        );
    }

    #[test]
    fn test_vendor_bid_accepts_numeric_identifiers() {
        let bid: VendorBid = serde_json::from_value(json!({
            "bid_id": "aaaa1234",
            "cpm": 22.0,
            "width": 300,
            "height": 250,
            "creative_id": 1234,
            "currency": "EUR",
            "net_revenue": true,
            "ttl": 300,
            "ad": "<div>ad</div>",
            "bidder": "msqClassic",
            "code": "test/publishername_atf_desktop_rg_pave",
            "deal_id": 98765
        }))
        .expect("should deserialize vendor bid");

        assert_eq!(bid.creative_id.as_deref(), Some("1234"));
        assert_eq!(bid.deal_id.as_deref(), Some("98765"));
        assert_eq!(bid.cpm, Some(22.0));
        assert_eq!(bid.ttl, Some(300));
    }

    #[test]
    fn test_vendor_bid_accepts_float_and_string_numbers() {
        let bid: VendorBid = serde_json::from_value(json!({
            "bid_id": "aaaa1234",
            "cpm": "1.20",
            "width": 300.0,
            "height": "250",
            "ttl": 300.0
        }))
        .expect("should deserialize vendor bid");

        assert_eq!(bid.cpm, Some(1.2));
        assert_eq!(bid.width, Some(300));
        assert_eq!(bid.height, Some(250));
        assert_eq!(bid.ttl, Some(300));
    }

    #[test]
    fn test_vendor_bid_wrong_types_are_absent() {
        let bid: VendorBid = serde_json::from_value(json!({
            "bid_id": "aaaa1234",
            "cpm": "free",
            "width": 300.5,
            "height": -250,
            "currency": ["EUR"],
            "net_revenue": "yes",
            "ad": null
        }))
        .expect("should deserialize vendor bid");

        assert_eq!(
            bid,
            VendorBid {
                bid_id: Some("aaaa1234".to_string()),
                ..VendorBid::default()
            }
        );
    }
}
