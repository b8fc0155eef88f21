use thiserror::Error;

/// Errors surfaced by the Paybox integration.
///
/// Every variant is terminal for the request that produced it: nothing is
/// retried internally except transport failures inside the bounded retry
/// layer (see [`crate::config::RetryPolicy`]).
#[derive(Error, Debug)]
pub enum PayboxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Gateway error: {description}")]
    Gateway {
        code: Option<String>,
        description: String,
    },

    #[error("Signature verification failed")]
    SignatureMismatch,

    #[error("Unexpected pg_result value")]
    UnexpectedResult { value: Option<String> },

    #[error("Payment record error: {0}")]
    Record(String),
}

impl PayboxError {
    /// Check whether this failure happened on the wire and may be transient.
    ///
    /// The retry layer only re-sends on transport failures; the gateway
    /// offers no idempotency guarantee beyond the order id being stable, so
    /// everything else propagates immediately.
    pub fn is_transport(&self) -> bool {
        matches!(self, PayboxError::Transport(_))
    }

    /// Check whether the gateway itself rejected the request.
    pub fn is_gateway_error(&self) -> bool {
        matches!(self, PayboxError::Gateway { .. })
    }
}
