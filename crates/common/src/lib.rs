//! Mediasquare bid adapter for header-bidding hosts.
//!
//! This crate maps the host's bid requests to the Mediasquare auction
//! payload, maps the bidder's answer back to normalized bids, and builds the
//! cookie-sync and winning-notification URLs.
//!
//! # Modules
//!
//! - [`adapter`]: The [`adapter::BidAdapter`] hooks and the Mediasquare implementation
//! - [`constants`]: Bidder code, aliases and endpoint paths
//! - [`endpoints`]: Production/test host selection
//! - [`error`]: Error types
//! - [`registry`]: Lookup of adapters by bidder code and alias
//! - [`settings`]: Configuration loading and per-call flags
//! - [`sync`]: Cookie sync descriptors
//! - [`types`]: Host-side request and bid shapes
//! - [`winning`]: Winning notification pixel
//! - [`wire`]: Mediasquare wire format
//! - [`test_support`]: Testing utilities

pub mod adapter;
pub mod constants;
pub mod endpoints;
pub mod error;
pub mod registry;
pub mod settings;
pub mod sync;
pub mod types;
pub mod winning;
pub mod wire;
