/// Default node JSON-RPC endpoint
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:9933";
/// Default validator JSON-RPC endpoint (served by the node in local setups)
pub const DEFAULT_VALIDATOR_URL: &str = "http://127.0.0.1:9933";
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default record subscription poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
/// Default quiet period between an edit and its validation
pub const DEFAULT_DEBOUNCE_MS: u64 = 150;
/// Default time to wait for validator and chain responses before submitting
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 30_000;
/// Default concurrency for storage scans
pub const DEFAULT_SCAN_CONCURRENCY: usize = 16;
/// Development signer used when none is configured
pub const DEFAULT_SIGNER: &str = "//Alice";
/// Per-user directory name under the home directory
pub const USER_DIR_NAME: &str = ".siip";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "siip.log";
