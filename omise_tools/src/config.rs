use std::time::Duration;

use dnt_common::Secret;
use log::*;

const DEFAULT_API_URL: &str = "https://api.omise.co";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OmiseConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// Upper bound on any single round-trip to Omise. A hung gateway call must surface as a
    /// timeout rather than leaving an order pending forever.
    pub timeout: Duration,
}

impl Default for OmiseConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            secret_key: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OmiseConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("OMISE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let secret_key = Secret::new(std::env::var("OMISE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("OMISE_SECRET_KEY not set, using a (probably useless) default");
            "skey_test_00000000000000".to_string()
        }));
        let timeout = std::env::var("OMISE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { api_url, secret_key, timeout }
    }
}
