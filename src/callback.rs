use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PayboxError;
use crate::outcome::Outcome;
use crate::payment::{PaymentRecord, PaymentStatus};
use crate::sig;
use crate::types::Currency;

/// Body an accepted callback must be answered with, verbatim. Anything
/// else makes the gateway retry.
pub const ACK_BODY: &str = "OK";

/// Raw inbound callback data, exactly as received in the query string.
///
/// The callback is signed over these raw string values, so no typing
/// happens before verification. `pg_result`, `pg_failure_code` and
/// `pg_failure_description` only ever exist here; they are protocol
/// extensions outside the typed check payload.
pub type CallbackParams = HashMap<String, String>;

/// Typed form of the gateway's check/result notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckPayload {
    pub pg_order_id: String,
    pub pg_payment_id: i64,
    pub pg_amount: i64,
    pub pg_currency: Currency,
    pub pg_ps_currency: Currency,
    pub pg_ps_amount: i64,
    pub pg_ps_full_amount: i64,
    pub pg_payment_system: String,
    pub pg_salt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_sig: Option<String>,
}

/// Verify an inbound callback's signature.
///
/// Callbacks use the payment's order token in place of a script name as
/// the step identifier. Every received key except `pg_sig` participates,
/// values as raw strings. A callback without `pg_sig` verifies false.
pub fn verify_callback(
    params: &CallbackParams,
    order_token: &str,
    secret: &str,
) -> Result<bool, PayboxError> {
    let Some(carried) = params.get(sig::SIG_FIELD) else {
        return Ok(false);
    };
    sig::check_sig(params, secret, order_token, carried)
}

/// Verify a callback and apply its result to the payment record.
///
/// `pg_result` `"1"` confirms the payment, `"0"` rejects it and stores the
/// failure code/description on the record's notes; both record the
/// gateway-side payment id as the transaction id. Any failure leaves no
/// acknowledgement, so the gateway retries; signature and result-domain
/// failures additionally leave the record untouched.
pub async fn process_callback<P: PaymentRecord>(
    payment: &mut P,
    params: &CallbackParams,
    secret: &str,
) -> Result<Outcome, PayboxError> {
    let token = payment.token();
    if !verify_callback(params, &token, secret)? {
        warn!(order_id = %token, "callback signature mismatch");
        return Err(PayboxError::SignatureMismatch);
    }

    let result = params.get("pg_result").map(String::as_str);
    if !matches!(result, Some("0") | Some("1")) {
        warn!(order_id = %token, result = ?result, "callback carried an unknown result code");
        return Err(PayboxError::UnexpectedResult {
            value: result.map(str::to_string),
        });
    }

    let transaction_id = params
        .get("pg_payment_id")
        .ok_or_else(|| PayboxError::Parse("callback is missing pg_payment_id".into()))?
        .parse::<i64>()
        .map_err(|_| PayboxError::Parse("pg_payment_id is not numeric".into()))?;
    payment.set_transaction_id(transaction_id).await?;

    if result == Some("1") {
        payment.set_status(PaymentStatus::Confirmed).await?;
        info!(order_id = %token, transaction_id, "payment confirmed by gateway callback");
    } else {
        payment.set_status(PaymentStatus::Rejected).await?;
        let code = params.get("pg_failure_code").map(String::as_str).unwrap_or("");
        let description = params
            .get("pg_failure_description")
            .map(String::as_str)
            .unwrap_or("");
        payment
            .set_notes(&format!("Code: {code}; Description: {description}"))
            .await?;
        info!(order_id = %token, transaction_id, code, "payment rejected by gateway callback");
    }

    Ok(Outcome::Ack(ACK_BODY))
}
