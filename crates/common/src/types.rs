//! Host-side shapes exchanged with the header-bidding framework.
//!
//! Field names follow the framework's camelCase JSON so that host objects
//! deserialize directly. Fields the host may leave out are `Option`s and are
//! dropped from serialized output when absent.

use std::collections::HashMap;

use error_stack::{Report, ResultExt};
use http::header::CONTENT_TYPE;
use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as Json};

use crate::constants::AUCTION_CONTENT_TYPE;
use crate::error::AdapterError;

/// Media type enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
    Native,
}

/// Vendor seat identifiers configured on an ad unit.
///
/// A numeric `0` counts as absent, as does any value that is neither a string
/// nor a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidParams {
    #[serde(
        default,
        deserialize_with = "seat_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner: Option<String>,

    #[serde(
        default,
        deserialize_with = "seat_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
}

impl BidParams {
    /// True when at least one seat identifier is non-empty.
    #[must_use]
    pub fn has_seat(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.owner) || present(&self.code)
    }
}

/// Banner declaration of an ad unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BannerMediaType {
    /// Accepted sizes `[[width, height], ...]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<[u32; 2]>>,

    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

/// Formats declared on an ad unit. Forwarded to the vendor untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<BannerMediaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Json>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Json>,

    #[serde(flatten)]
    pub extra: Map<String, Json>,
}

impl MediaTypes {
    /// Media types declared on this ad unit, in banner/video/native order.
    #[must_use]
    pub fn declared(&self) -> Vec<MediaType> {
        let mut declared = Vec::new();
        if self.banner.is_some() {
            declared.push(MediaType::Banner);
        }
        if self.video.is_some() {
            declared.push(MediaType::Video);
        }
        if self.native.is_some() {
            declared.push(MediaType::Native);
        }
        declared
    }
}

/// One bid request per ad unit, supplied by the host for each auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRequest {
    /// Bidder code the host routed this request to
    #[serde(default)]
    pub bidder: String,
    #[serde(default)]
    pub params: BidParams,
    pub ad_unit_code: String,
    pub bid_id: String,
    pub auction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub media_types: MediaTypes,
}

/// Page information resolved by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefererInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

/// Consent data resolved by the host's consent management module.
///
/// Values of the wrong JSON type are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GdprConsent {
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub consent_string: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub gdpr_applies: Option<bool>,
}

/// Auction-level context, one per auction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderRequest {
    #[serde(default)]
    pub referer_info: RefererInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr_consent: Option<GdprConsent>,
}

/// HTTP request the host transport executes on the adapter's behalf.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServerRequest {
    #[serde(serialize_with = "serialize_method")]
    pub method: Method,
    pub url: String,
    /// Serialized JSON payload
    pub data: String,
}

impl ServerRequest {
    /// Convert into an `http` request carrying the payload as a text body.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid request URI.
    pub fn to_http_request(&self) -> Result<http::Request<String>, Report<AdapterError>> {
        http::Request::builder()
            .method(self.method.clone())
            .uri(self.url.as_str())
            .header(CONTENT_TYPE, AUCTION_CONTENT_TYPE)
            .body(self.data.clone())
            .change_context(AdapterError::InvalidRequest {
                message: format!("Failed to build HTTP request for {}", self.url),
            })
    }
}

fn serialize_method<S>(method: &Method, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(method.as_str())
}

/// Successful response handed back by the host transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub body: Json,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl ServerResponse {
    #[must_use]
    pub fn new(body: Json) -> Self {
        Self {
            body,
            headers: HashMap::new(),
        }
    }
}

/// Provenance tag attached to every bid this adapter produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediasquareTag {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bidder: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
}

/// Bid in the host's normalized shape.
///
/// Fields are copied from the vendor bid as they arrive; the host decides
/// whether a bid missing a field is acceptable. Absent fields are omitted
/// from serialized output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBid {
    /// `bidId` of the originating bid request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_revenue: Option<bool>,
    /// Seconds the bid stays valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Creative markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad: Option<String>,
    pub mediasquare: MediasquareTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
}

/// The bid the host reports as auction winner.
///
/// Every field is optional; the winning pixel only reports what is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WonBid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediasquare: Option<MediasquareTag>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub cpm: Option<f64>,
    /// Rendered size, e.g. `300x250`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub creative_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_unit_code: Option<String>,
    /// Milliseconds the bidder took to answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_respond: Option<u64>,
}

/// Which sync mechanisms the host allows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    #[serde(default)]
    pub iframe_enabled: bool,
    #[serde(default)]
    pub pixel_enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserSyncKind {
    Iframe,
    Image,
}

/// A cookie-sync descriptor the host drops on the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSync {
    #[serde(rename = "type")]
    pub kind: UserSyncKind,
    pub url: String,
}

/// Timeout notification for one bid request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_unit_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<String>,
    /// Configured timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Seat identifier with JavaScript truthiness: empty strings are kept (and
/// rejected by [`BidParams::has_seat`]), a numeric zero and non-scalar values
/// become `None`.
fn seat_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Json>::deserialize(deserializer)? {
        Some(Json::String(value)) => Some(value),
        Some(Json::Number(value)) if value.as_f64().is_some_and(|v| v == 0.0) => None,
        Some(Json::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}

/// String that may arrive as a JSON number. Other types map to `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Json>::deserialize(deserializer)? {
        Some(Json::String(value)) => Some(value),
        Some(Json::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}

/// Finite number given as a JSON number or a numeric string.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Json>::deserialize(deserializer)? {
        Some(Json::Number(value)) => value.as_f64(),
        Some(Json::String(value)) => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

/// Non-negative integer given as a JSON integer, an integral float such as
/// `300.0`, or a numeric string.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Json>::deserialize(deserializer)? {
        Some(Json::Number(value)) => value.as_f64(),
        Some(Json::String(value)) => value.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.and_then(integral_u32))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_u32(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value))
        .then_some(value as u32)
}

/// Deserialize an optional value, mapping values of the wrong type to `None`.
pub(crate) fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Json>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
