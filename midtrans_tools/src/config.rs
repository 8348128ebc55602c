use std::{env, time::Duration};

use doakan_common::Secret;
use log::*;

pub const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
pub const DEFAULT_BANK: &str = "bca";
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    /// Base URL of the Core API, without a trailing path, e.g. "https://api.midtrans.com"
    pub api_url: String,
    pub server_key: Secret<String>,
    /// Bank used for virtual-account charges (bca, bni, bri, permata, ...)
    pub bank: String,
    /// Upper bound on a single charge call, including connection setup.
    pub timeout: Duration,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            api_url: SANDBOX_API_URL.to_string(),
            server_key: Secret::default(),
            bank: DEFAULT_BANK.to_string(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl MidtransConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = env::var("DKN_MIDTRANS_API_URL").unwrap_or_else(|_| {
            warn!("💳️ DKN_MIDTRANS_API_URL not set, using the sandbox API ({SANDBOX_API_URL})");
            SANDBOX_API_URL.to_string()
        });
        let server_key = Secret::new(env::var("DKN_MIDTRANS_SERVER_KEY").unwrap_or_else(|_| {
            error!("💳️ DKN_MIDTRANS_SERVER_KEY not set. Charges and notification signatures will fail.");
            String::default()
        }));
        let bank = env::var("DKN_MIDTRANS_BANK").map(|s| s.to_lowercase()).unwrap_or_else(|_| {
            info!("💳️ DKN_MIDTRANS_BANK not set, using {DEFAULT_BANK} as default");
            DEFAULT_BANK.to_string()
        });
        let timeout = env::var("DKN_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("💳️ Invalid configuration value for DKN_GATEWAY_TIMEOUT_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        Self { api_url, server_key, bank, timeout }
    }
}
