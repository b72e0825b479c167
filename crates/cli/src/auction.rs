//! Adapter commands: build and send auction requests, interpret responses,
//! produce user syncs and fire winning pixels.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use http::Method;
use msq_adapter_common::adapter::BidAdapter;
use msq_adapter_common::constants::BIDDER_CODE;
use msq_adapter_common::endpoints::Endpoints;
use msq_adapter_common::registry::BidderRegistry;
use msq_adapter_common::settings::{AdapterFlags, Settings};
use msq_adapter_common::types::{
    BidRequest, BidderRequest, GdprConsent, NormalizedBid, ServerRequest, ServerResponse,
    SyncOptions, UserSync, WonBid,
};
use msq_adapter_common::winning::PixelSender;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CliError;
use crate::pixel::{DryRunPixelSender, UreqPixelSender};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::Input(format!("Failed to parse {}: {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve the Mediasquare adapter from the registry.
///
/// Fails when the adapter is disabled in settings.
pub(crate) fn resolve_adapter(settings: &Settings) -> Result<Arc<dyn BidAdapter>, CliError> {
    BidderRegistry::from_settings(settings)
        .get(BIDDER_CODE)
        .ok_or_else(|| {
            CliError::Config(format!(
                "Bidder '{BIDDER_CODE}' is disabled (set mediasquare.enabled = true)"
            ))
        })
}

/// Flags for this invocation: test mode from the page URL, debug from
/// settings unless forced on the command line.
pub(crate) fn flags_for(settings: &Settings, page_url: Option<&str>, debug: bool) -> AdapterFlags {
    let mut flags = AdapterFlags::from_page_url(&settings.mediasquare, page_url);
    flags.debug |= debug;
    flags
}

/// Drop invalid bid requests the way the host does, then build the request.
pub(crate) fn build_auction_request(
    adapter: &dyn BidAdapter,
    bids: Vec<BidRequest>,
    bidder_request: &BidderRequest,
    flags: &AdapterFlags,
) -> Result<ServerRequest, CliError> {
    let total = bids.len();
    let valid: Vec<BidRequest> = bids
        .into_iter()
        .filter(|bid| adapter.is_bid_request_valid(bid))
        .collect();

    if valid.len() < total {
        log::warn!(
            "Skipping {} bid requests without owner or code",
            total - valid.len()
        );
    }

    Ok(adapter.build_requests(&valid, bidder_request, flags)?)
}

/// POST the auction request and wrap the JSON answer.
fn send_auction_request(request: &ServerRequest) -> Result<ServerResponse, CliError> {
    log::info!("Sending auction request to {}", request.url);

    let response = ureq::run(request.to_http_request()?)
        .map_err(|e| CliError::Http(format!("Failed to send auction request: {}", e)))?;

    let status = response.status();
    let body = response.into_body().read_to_string()?;
    log::debug!("Bidder answered {}: {}", status, body);

    if body.trim().is_empty() {
        return Ok(ServerResponse::default());
    }

    let body = serde_json::from_str(&body)
        .map_err(|e| CliError::Http(format!("Bidder returned invalid JSON: {}", e)))?;
    Ok(ServerResponse::new(body))
}

pub(crate) fn request_from_files(
    settings: &Settings,
    bids_file: &Path,
    bidder_request_file: &Path,
    page_url: Option<&str>,
    debug: bool,
) -> Result<(Arc<dyn BidAdapter>, ServerRequest), CliError> {
    let adapter = resolve_adapter(settings)?;
    let bids: Vec<BidRequest> = read_json(bids_file)?;
    let bidder_request: BidderRequest = read_json(bidder_request_file)?;
    let flags = flags_for(settings, page_url, debug);

    let request = build_auction_request(adapter.as_ref(), bids, &bidder_request, &flags)?;
    Ok((adapter, request))
}

pub fn request(
    settings: &Settings,
    bids_file: &Path,
    bidder_request_file: &Path,
    page_url: Option<&str>,
    debug: bool,
    send: bool,
) -> Result<(), CliError> {
    let (adapter, request) =
        request_from_files(settings, bids_file, bidder_request_file, page_url, debug)?;
    print_json(&request)?;

    if send {
        let response = send_auction_request(&request)?;
        let bids = adapter.interpret_response(&response, &request);
        println!("\nBidder returned {} bids:", bids.len());
        print_json(&bids)?;
    }

    Ok(())
}

pub(crate) fn interpret_file(
    settings: &Settings,
    response_file: &Path,
) -> Result<Vec<NormalizedBid>, CliError> {
    let adapter = resolve_adapter(settings)?;
    let body = read_json(response_file)?;
    let placeholder = ServerRequest {
        method: Method::POST,
        url: Endpoints::new(&settings.mediasquare).auction_url(&AdapterFlags::default()),
        data: String::new(),
    };

    Ok(adapter.interpret_response(&ServerResponse::new(body), &placeholder))
}

pub fn interpret(settings: &Settings, response_file: &Path) -> Result<(), CliError> {
    let bids = interpret_file(settings, response_file)?;
    println!("{} bids:", bids.len());
    print_json(&bids)
}

pub(crate) fn user_sync(
    settings: &Settings,
    sync_options: &SyncOptions,
    gdpr_consent: Option<&GdprConsent>,
    page_url: Option<&str>,
) -> Result<Option<UserSync>, CliError> {
    let adapter = resolve_adapter(settings)?;
    let flags = flags_for(settings, page_url, false);
    Ok(adapter.get_user_syncs(sync_options, &[], gdpr_consent, &flags))
}

pub fn sync(
    settings: &Settings,
    sync_options: &SyncOptions,
    gdpr_consent: Option<&GdprConsent>,
    page_url: Option<&str>,
) -> Result<(), CliError> {
    match user_sync(settings, sync_options, gdpr_consent, page_url)? {
        Some(sync) => print_json(&sync),
        None => {
            println!("No user sync allowed by the given options");
            Ok(())
        }
    }
}

pub(crate) fn fire_won(
    settings: &Settings,
    bid: &WonBid,
    page_url: Option<&str>,
    sender: &dyn PixelSender,
) -> Result<(), CliError> {
    let adapter = resolve_adapter(settings)?;
    let flags = flags_for(settings, page_url, false);
    adapter.on_bid_won(bid, &flags, sender);
    Ok(())
}

pub fn won(
    settings: &Settings,
    bid_file: &Path,
    page_url: Option<&str>,
    dry_run: bool,
) -> Result<(), CliError> {
    let bid: WonBid = read_json(bid_file)?;

    if dry_run {
        return fire_won(settings, &bid, page_url, &DryRunPixelSender::default());
    }

    let sender = UreqPixelSender::new();
    fire_won(settings, &bid, page_url, &sender)?;
    sender.drain();
    println!("Winning pixel fired");
    Ok(())
}
