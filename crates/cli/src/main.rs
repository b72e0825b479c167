//! Mediasquare adapter CLI.
//!
//! This tool provides commands for:
//! - Validating configuration files
//! - Building (and optionally sending) auction requests from host JSON
//! - Interpreting bidder responses
//! - Producing cookie-sync descriptors
//! - Firing winning notification pixels

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use msq_adapter_common::types::{GdprConsent, SyncOptions};

mod auction;
mod config;
mod error;
mod logging;
mod pixel;

use error::CliError;

#[derive(Parser)]
#[command(name = "msqcli")]
#[command(about = "Mediasquare bid adapter CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file; the embedded defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Build the auction request for a set of bid requests
    Request {
        /// JSON array of host bid requests
        #[arg(long)]
        bids: PathBuf,

        /// JSON host bidder request (referer and consent)
        #[arg(long)]
        bidder_request: PathBuf,

        /// Page URL the auction runs on, used for test mode detection
        #[arg(long)]
        page_url: Option<String>,

        /// Ask the bidder for a debug auction
        #[arg(long)]
        debug: bool,

        /// POST the request and interpret the answer
        #[arg(long)]
        send: bool,
    },

    /// Map a bidder response to normalized bids
    Interpret {
        /// JSON bidder response body
        #[arg(long)]
        response: PathBuf,
    },

    /// Produce the cookie-sync descriptor
    Sync {
        /// Allow iframe syncs
        #[arg(long)]
        iframe: bool,

        /// Allow image pixel syncs
        #[arg(long)]
        pixel: bool,

        /// GDPR consent string
        #[arg(long)]
        consent_string: Option<String>,

        /// Whether GDPR applies
        #[arg(long)]
        gdpr_applies: Option<bool>,

        /// Page URL the auction runs on, used for test mode detection
        #[arg(long)]
        page_url: Option<String>,
    },

    /// Fire the winning notification pixel for a bid
    Won {
        /// JSON winning bid
        #[arg(long)]
        bid: PathBuf,

        /// Page URL the auction runs on, used for test mode detection
        #[arg(long)]
        page_url: Option<String>,

        /// Print the pixel URL without requesting it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config against settings validation
    Validate {
        /// Path to the TOML configuration file
        #[arg(long, short)]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let verbose = cli.verbose;
    let load_settings = || config::load_settings(cli.config.as_deref(), verbose);

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Validate { file } => config::validate(file, verbose),
        },
        Commands::Request {
            bids,
            bidder_request,
            page_url,
            debug,
            send,
        } => auction::request(
            &load_settings()?,
            &bids,
            &bidder_request,
            page_url.as_deref(),
            debug,
            send,
        ),
        Commands::Interpret { response } => auction::interpret(&load_settings()?, &response),
        Commands::Sync {
            iframe,
            pixel,
            consent_string,
            gdpr_applies,
            page_url,
        } => {
            let sync_options = SyncOptions {
                iframe_enabled: iframe,
                pixel_enabled: pixel,
            };
            let gdpr_consent = (consent_string.is_some() || gdpr_applies.is_some()).then(|| {
                GdprConsent {
                    consent_string,
                    gdpr_applies,
                }
            });
            auction::sync(
                &load_settings()?,
                &sync_options,
                gdpr_consent.as_ref(),
                page_url.as_deref(),
            )
        }
        Commands::Won {
            bid,
            page_url,
            dry_run,
        } => auction::won(&load_settings()?, &bid, page_url.as_deref(), dry_run),
    }
}
