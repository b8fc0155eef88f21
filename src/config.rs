use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::PayboxError;
use crate::types::OnOff;

/// Body encoding used for the outbound init request.
///
/// The gateway's documented protocol is field-encoded, but the integration
/// this crate replaces posts JSON with `Content-Type: application/json` and
/// the gateway accepts it. Until the documented encoding is confirmed
/// against current gateway behavior, `Json` stays the default and `Form` is
/// available as a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEncoding {
    Json,
    Form,
}

impl FromStr for WireEncoding {
    type Err = PayboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(WireEncoding::Json),
            "form" => Ok(WireEncoding::Form),
            other => Err(PayboxError::Config(format!(
                "PAYBOX_WIRE_ENCODING must be json or form, got {other:?}"
            ))),
        }
    }
}

/// Bounded retry for transient transport failures around `send`.
///
/// The gateway offers no idempotency guarantee beyond the order id staying
/// stable across attempts, so only transport errors are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

/// Provider options plus client tuning, immutable after construction.
#[derive(Clone)]
pub struct PayboxConfig {
    pub merchant_id: i64,
    /// Shared signing secret. Never logged; `Debug` redacts it.
    pub secret: String,
    pub site_url: Url,
    pub testing_mode: OnOff,
    pub base_url: String,
    pub wire_encoding: WireEncoding,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl PayboxConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://paybox.kz";

    pub fn new(
        merchant_id: i64,
        secret: impl Into<String>,
        site_url: Url,
    ) -> Self {
        PayboxConfig {
            merchant_id,
            secret: secret.into(),
            site_url,
            testing_mode: OnOff::On,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            wire_encoding: WireEncoding::Json,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `PAYBOX_MERCHANT_ID`, `PAYBOX_SECRET`, `PAYBOX_SITE_URL`.
    /// Optional: `PAYBOX_TESTING_MODE` (default on), `PAYBOX_BASE_URL`,
    /// `PAYBOX_WIRE_ENCODING` (json|form), `PAYBOX_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PayboxError> {
        dotenvy::dotenv().ok();

        let merchant_id = require("PAYBOX_MERCHANT_ID")?
            .parse::<i64>()
            .map_err(|_| PayboxError::Config("PAYBOX_MERCHANT_ID must be an integer".into()))?;
        let secret = require("PAYBOX_SECRET")?;
        let site_url = Url::parse(&require("PAYBOX_SITE_URL")?)
            .map_err(|e| PayboxError::Config(format!("PAYBOX_SITE_URL is not a valid URL: {e}")))?;

        let mut config = PayboxConfig::new(merchant_id, secret, site_url);

        if let Ok(raw) = env::var("PAYBOX_TESTING_MODE") {
            config.testing_mode = raw.parse()?;
        }
        if let Ok(raw) = env::var("PAYBOX_BASE_URL") {
            config.base_url = raw.trim_end_matches('/').to_string();
        }
        if let Ok(raw) = env::var("PAYBOX_WIRE_ENCODING") {
            config.wire_encoding = raw.parse()?;
        }
        if let Ok(raw) = env::var("PAYBOX_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| PayboxError::Config("PAYBOX_TIMEOUT_SECS must be an integer".into()))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

impl fmt::Debug for PayboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayboxConfig")
            .field("merchant_id", &self.merchant_id)
            .field("secret", &"<redacted>")
            .field("site_url", &self.site_url.as_str())
            .field("testing_mode", &self.testing_mode)
            .field("base_url", &self.base_url)
            .field("wire_encoding", &self.wire_encoding)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

fn require(name: &str) -> Result<String, PayboxError> {
    env::var(name).map_err(|_| PayboxError::Config(format!("Missing {name}")))
}
