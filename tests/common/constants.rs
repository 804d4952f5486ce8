//! Shared constants for end-to-end tests

/// Timeout applied to every request made by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum time to wait for a spawned server to answer /healthz
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Barcode the stub metadata provider resolves
pub const KNOWN_BARCODE: &str = "0077774644129";

/// Title of the release behind `KNOWN_BARCODE`
pub const KNOWN_BARCODE_TITLE: &str = "Abbey Road";

/// Artist of the release behind `KNOWN_BARCODE`
pub const KNOWN_BARCODE_ARTIST: &str = "The Beatles";
