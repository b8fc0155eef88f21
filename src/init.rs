use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PayboxError;
use crate::types::{Currency, InitStatus, Language, OnOff, RedirectUrlType, RequestMethod};

/// Outgoing `init_payment.php` payload.
///
/// Presence tracking is carried by `Option` plus skip-if-none
/// serialization: the serialized form is exactly the field-set the
/// signature engine consumes, so an unset optional field contributes
/// nothing to the signing string. `pg_sig` is set last and excluded from
/// its own signing input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitPaymentRequest {
    pub pg_merchant_id: i64,
    pub pg_order_id: String,
    /// Amount in minor currency units.
    pub pg_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_payment_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_lifetime: Option<i64>,
    pub pg_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_postpone_payment: Option<OnOff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_testing_mode: Option<OnOff>,
    // urls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_check_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_result_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_refund_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_capture_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_success_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_failure_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_state_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_site_url: Option<Url>,
    // request methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_request_method: Option<RequestMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_success_url_method: Option<RequestMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_failure_url_method: Option<RequestMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_state_url_method: Option<RequestMethod>,
    // user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_user_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_user_contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_user_ip: Option<IpAddr>,
    // recurring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_recurring_start: Option<OnOff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_recurring_lifetime: Option<i64>,
    // sig
    pub pg_salt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_sig: Option<String>,
}

impl InitPaymentRequest {
    /// Request with the required fields set and every optional field unset.
    pub fn new(
        merchant_id: i64,
        order_id: impl Into<String>,
        amount: i64,
        description: impl Into<String>,
        salt: impl Into<String>,
    ) -> Self {
        InitPaymentRequest {
            pg_merchant_id: merchant_id,
            pg_order_id: order_id.into(),
            pg_amount: amount,
            pg_currency: None,
            pg_payment_system: None,
            pg_lifetime: None,
            pg_description: description.into(),
            pg_postpone_payment: None,
            pg_language: None,
            pg_testing_mode: None,
            pg_check_url: None,
            pg_result_url: None,
            pg_refund_url: None,
            pg_capture_url: None,
            pg_success_url: None,
            pg_failure_url: None,
            pg_state_url: None,
            pg_site_url: None,
            pg_request_method: None,
            pg_success_url_method: None,
            pg_failure_url_method: None,
            pg_state_url_method: None,
            pg_user_phone: None,
            pg_user_contact_email: None,
            pg_user_ip: None,
            pg_recurring_start: None,
            pg_recurring_lifetime: None,
            pg_salt: salt.into(),
            pg_sig: None,
        }
    }

    /// Validate the required fields and any set value whose format the
    /// protocol constrains. URL and IP fields are already format-safe by
    /// type; email is checked here.
    pub fn validate(&self) -> Result<(), PayboxError> {
        if self.pg_order_id.is_empty() {
            return Err(PayboxError::Validation("pg_order_id must not be empty".into()));
        }
        if self.pg_amount <= 0 {
            return Err(PayboxError::Validation("pg_amount must be positive".into()));
        }
        if self.pg_description.is_empty() {
            return Err(PayboxError::Validation(
                "pg_description must not be empty".into(),
            ));
        }
        if let Some(email) = &self.pg_user_contact_email {
            if !is_plausible_email(email) {
                return Err(PayboxError::Validation(format!(
                    "pg_user_contact_email is not a valid email address: {email}"
                )));
            }
        }
        Ok(())
    }
}

/// Minimal `local@domain.tld` shape check; the gateway does its own full
/// validation.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// Parsed `init_payment.php` XML response.
///
/// The success group (`pg_payment_id`, `pg_redirect_url`, ...) and the
/// error group (`pg_error_code`, `pg_error_description`) are exclusive by
/// protocol convention only; [`crate::client::PayboxClient::initiate`]
/// enforces the convention. `pg_redirect_url` stays the exact received
/// string because it re-enters the signing input byte for byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "response")]
pub struct InitPaymentResponse {
    pub pg_status: InitStatus,
    // success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_payment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_redirect_url_type: Option<RedirectUrlType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_salt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_sig: Option<String>,
    // error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_error_description: Option<String>,
}

impl InitPaymentResponse {
    /// Decode the gateway's XML body (root element `response`).
    pub fn from_xml(body: &str) -> Result<Self, PayboxError> {
        let response: InitPaymentResponse = quick_xml::de::from_str(body)
            .map_err(|e| PayboxError::Parse(format!("malformed init response XML: {e}")))?;
        if let Some(redirect) = &response.pg_redirect_url {
            Url::parse(redirect).map_err(|e| {
                PayboxError::Parse(format!("pg_redirect_url is not a valid URL: {e}"))
            })?;
        }
        Ok(response)
    }

    /// Encode back to the wire XML form. Exists for round-trip coverage and
    /// for replaying responses in tests.
    pub fn to_xml(&self) -> Result<String, PayboxError> {
        quick_xml::se::to_string(self)
            .map_err(|e| PayboxError::Parse(format!("cannot encode init response: {e}")))
    }
}
