use async_trait::async_trait;

use crate::error::PayboxError;

/// Lifecycle status of a payment as this integration drives it.
///
/// `Confirmed` and `Rejected` are terminal: no transition is defined out of
/// either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// The caller-owned payment record this crate reads and mutates.
///
/// The record is the only shared mutable resource in the integration. The
/// crate assumes at most one callback is being processed per payment at a
/// time; the gateway does retry callbacks, so callers that may see
/// concurrent duplicates need their own locking — this is an assumption,
/// not a guarantee enforced here.
#[async_trait]
pub trait PaymentRecord: Send + Sync {
    /// Stable order token, used as `pg_order_id` and as the step identifier
    /// when verifying callbacks.
    fn token(&self) -> String;

    /// Total amount in minor currency units.
    fn total(&self) -> i64;

    /// ISO currency code; empty means unset.
    fn currency(&self) -> String;

    fn description(&self) -> String;

    /// Billing email; empty means absent, matching the gateway's optional
    /// contact field.
    fn billing_email(&self) -> String;

    /// URL the gateway calls with the payment result (`pg_result_url`).
    fn process_url(&self) -> String;

    /// URL the payer lands on after a successful payment.
    fn success_url(&self) -> String;

    /// URL the payer lands on after a failed payment.
    fn failure_url(&self) -> String;

    fn status(&self) -> PaymentStatus;

    /// Whether the record has been stored and assigned an identifier.
    /// `initiate` persists it first when this is false.
    fn is_persisted(&self) -> bool;

    async fn persist(&mut self) -> Result<(), PayboxError>;

    async fn set_status(&mut self, status: PaymentStatus) -> Result<(), PayboxError>;

    /// Record the gateway-side payment id.
    async fn set_transaction_id(&mut self, transaction_id: i64) -> Result<(), PayboxError>;

    /// Free-text notes; carries the failure code/description on rejection.
    async fn set_notes(&mut self, notes: &str) -> Result<(), PayboxError>;
}
