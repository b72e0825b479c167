pub const BIDDER_CODE: &str = "mediasquare";
pub const BIDDER_ALIASES: &[&str] = &["msq"];

pub const ENDPOINT_AUCTION: &str = "msq_prebid";
pub const ENDPOINT_SYNC: &str = "cookie_sync";
pub const ENDPOINT_WINNING: &str = "winning";

/// Content type of the auction POST body.
pub const AUCTION_CONTENT_TYPE: &str = "text/plain";
