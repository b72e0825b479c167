//! Mediasquare bid adapter.
//!
//! Translates host bid requests into the Mediasquare auction payload and maps
//! the bidder's answer back into normalized bids. Every call is stateless:
//! routing and debug switches arrive through [`AdapterFlags`].

use std::sync::Arc;

use error_stack::{Report, ResultExt};
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value as Json;

use crate::constants::{BIDDER_ALIASES, BIDDER_CODE};
use crate::endpoints::Endpoints;
use crate::error::AdapterError;
use crate::settings::{AdapterFlags, MediasquareConfig, Settings};
use crate::sync::user_sync;
use crate::types::{
    BidRequest, BidderRequest, GdprConsent, MediaType, MediasquareTag, NormalizedBid,
    ServerRequest, ServerResponse, SyncOptions, TimeoutData, UserSync, WonBid,
};
use crate::winning::{winning_url, PixelSender};
use crate::wire::{CodeEntry, GdprPayload, OutboundPayload, VendorBid};

/// Characters `encodeURIComponent` leaves as they are.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Hooks the header-bidding host calls on a bidder.
pub trait BidAdapter: Send + Sync {
    /// Bidder code the adapter registers under.
    fn code(&self) -> &'static str;

    /// Alternative codes publishers may configure.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn supported_media_types(&self) -> &'static [MediaType] {
        &[MediaType::Banner]
    }

    /// Whether the host should include this bid request in the auction.
    fn is_bid_request_valid(&self, bid: &BidRequest) -> bool;

    /// Build the auction HTTP request for every valid bid request.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    fn build_requests(
        &self,
        valid_bid_requests: &[BidRequest],
        bidder_request: &BidderRequest,
        flags: &AdapterFlags,
    ) -> Result<ServerRequest, Report<AdapterError>>;

    /// Map the bidder's response into normalized bids. Never fails.
    fn interpret_response(
        &self,
        server_response: &ServerResponse,
        request: &ServerRequest,
    ) -> Vec<NormalizedBid>;

    /// At most one cookie sync for this auction.
    fn get_user_syncs(
        &self,
        sync_options: &SyncOptions,
        server_responses: &[ServerResponse],
        gdpr_consent: Option<&GdprConsent>,
        flags: &AdapterFlags,
    ) -> Option<UserSync>;

    fn on_timeout(&self, _data: &[TimeoutData]) {}

    /// Notify the bidder that one of its bids won.
    fn on_bid_won(&self, bid: &WonBid, flags: &AdapterFlags, sender: &dyn PixelSender);
}

/// Mediasquare implementation of [`BidAdapter`].
pub struct MediasquareAdapter {
    endpoints: Endpoints,
}

impl MediasquareAdapter {
    #[must_use]
    pub fn new(config: &MediasquareConfig) -> Self {
        Self {
            endpoints: Endpoints::new(config),
        }
    }

    fn to_code_entry(bid: &BidRequest) -> CodeEntry {
        CodeEntry {
            owner: bid.params.owner.clone(),
            code: bid.params.code.clone(),
            adunit: bid.ad_unit_code.clone(),
            bid_id: bid.bid_id.clone(),
            auction_id: bid.auction_id.clone(),
            transaction_id: bid.transaction_id.clone(),
            mediatypes: bid.media_types.clone(),
        }
    }

    fn to_payload(
        valid_bid_requests: &[BidRequest],
        bidder_request: &BidderRequest,
        flags: &AdapterFlags,
    ) -> OutboundPayload {
        let referer = bidder_request
            .referer_info
            .referer
            .as_deref()
            .unwrap_or_default();

        OutboundPayload {
            codes: valid_bid_requests.iter().map(Self::to_code_entry).collect(),
            referer: utf8_percent_encode(referer, URI_COMPONENT).to_string(),
            gdpr: bidder_request
                .gdpr_consent
                .as_ref()
                .map(|consent| GdprPayload {
                    consent_string: consent.consent_string.clone(),
                    consent_required: consent.gdpr_applies,
                }),
            debug: flags.debug.then_some(true),
        }
    }

    fn to_normalized_bid(bid: VendorBid) -> NormalizedBid {
        NormalizedBid {
            request_id: bid.bid_id,
            cpm: bid.cpm,
            width: bid.width,
            height: bid.height,
            creative_id: bid.creative_id,
            currency: bid.currency,
            net_revenue: bid.net_revenue,
            ttl: bid.ttl,
            ad: bid.ad,
            mediasquare: MediasquareTag {
                bidder: bid.bidder,
                code: bid.code,
            },
            deal_id: bid.deal_id,
        }
    }

    /// Parse the `responses` collection of a bidder answer.
    ///
    /// Every entry becomes a bid, even one with missing or unreadable fields.
    /// Bids are not matched against the originating requests.
    fn parse_responses(body: &Json) -> Vec<NormalizedBid> {
        let Some(responses) = body.get("responses") else {
            log::debug!("Mediasquare: response has no 'responses' key, no bids");
            return Vec::new();
        };

        let entries: Vec<&Json> = match responses {
            Json::Array(entries) => entries.iter().collect(),
            Json::Object(entries) => entries.values().collect(),
            other => {
                log::warn!("Mediasquare: 'responses' is not a collection: {other}");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let bid = serde_json::from_value::<VendorBid>(entry.clone()).unwrap_or_else(|e| {
                    log::warn!("Mediasquare: bid at index {index} is not an object: {e}");
                    VendorBid::default()
                });
                Self::to_normalized_bid(bid)
            })
            .collect()
    }
}

impl BidAdapter for MediasquareAdapter {
    fn code(&self) -> &'static str {
        BIDDER_CODE
    }

    fn aliases(&self) -> &'static [&'static str] {
        BIDDER_ALIASES
    }

    fn is_bid_request_valid(&self, bid: &BidRequest) -> bool {
        bid.params.has_seat()
    }

    fn build_requests(
        &self,
        valid_bid_requests: &[BidRequest],
        bidder_request: &BidderRequest,
        flags: &AdapterFlags,
    ) -> Result<ServerRequest, Report<AdapterError>> {
        log::info!(
            "Mediasquare: building auction request for {} ad units (test_mode: {})",
            valid_bid_requests.len(),
            flags.test_mode
        );

        let payload = Self::to_payload(valid_bid_requests, bidder_request, flags);
        let data =
            serde_json::to_string(&payload).change_context(AdapterError::Serialization {
                message: "Failed to serialize Mediasquare auction payload".to_string(),
            })?;

        log::debug!("Mediasquare: auction payload: {data}");

        Ok(ServerRequest {
            method: Method::POST,
            url: self.endpoints.auction_url(flags),
            data,
        })
    }

    fn interpret_response(
        &self,
        server_response: &ServerResponse,
        _request: &ServerRequest,
    ) -> Vec<NormalizedBid> {
        let bids = Self::parse_responses(&server_response.body);
        log::info!("Mediasquare returned {} bids", bids.len());
        bids
    }

    fn get_user_syncs(
        &self,
        sync_options: &SyncOptions,
        _server_responses: &[ServerResponse],
        gdpr_consent: Option<&GdprConsent>,
        flags: &AdapterFlags,
    ) -> Option<UserSync> {
        user_sync(&self.endpoints.sync_url(flags), sync_options, gdpr_consent)
    }

    fn on_timeout(&self, data: &[TimeoutData]) {
        log::debug!("Mediasquare: {} bid requests timed out", data.len());
    }

    fn on_bid_won(&self, bid: &WonBid, flags: &AdapterFlags, sender: &dyn PixelSender) {
        let url = winning_url(&self.endpoints.winning_url(flags), bid);
        log::debug!("Mediasquare: firing winning pixel {url}");
        sender.fire(&url);
    }
}

/// Build the Mediasquare adapter if it is enabled in settings.
#[must_use]
pub fn register_adapter(settings: &Settings) -> Option<Arc<dyn BidAdapter>> {
    if !settings.mediasquare.enabled {
        log::info!("Mediasquare adapter not registered: disabled in settings");
        return None;
    }

    log::info!(
        "Registering Mediasquare adapter (production_host: {}, test_host: {})",
        settings.mediasquare.production_host,
        settings.mediasquare.test_host
    );
    Some(Arc::new(MediasquareAdapter::new(&settings.mediasquare)))
}
