//! Client for the Paybox hosted-payment gateway (paybox.kz).
//!
//! Paybox speaks a signed-field protocol: every payload exchanged with the
//! gateway is a flat set of `pg_*` fields authenticated by a keyed MD5
//! digest over the present field values. This crate covers the typed
//! payload models, the signature algorithm, the init-request flow that
//! ends in a redirect to the gateway's hosted payment page, and the
//! result-callback processing that moves a payment to its terminal status.
//!
//! The hosting web layer and the payment store stay outside: payments are
//! reached through the [`payment::PaymentRecord`] trait and every gateway
//! interaction resolves to an [`outcome::Outcome`] the web layer realizes
//! as a transport response.
//!
//! ```no_run
//! use paybox_rs::{PayboxClient, PayboxConfig};
//! # async fn demo(payment: &mut impl paybox_rs::PaymentRecord) -> Result<(), paybox_rs::PayboxError> {
//! let client = PayboxClient::new(PayboxConfig::from_env()?)?;
//! let outcome = client.initiate(payment).await?;
//! // outcome is Outcome::Redirect(url): send the payer there.
//! # Ok(()) }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod init;
pub mod outcome;
pub mod payment;
pub mod sig;
pub mod types;

pub use callback::{process_callback, verify_callback, CallbackParams, CheckPayload, ACK_BODY};
pub use client::{PayboxClient, INIT_SCRIPT_NAME};
pub use config::{PayboxConfig, RetryPolicy, WireEncoding};
pub use error::PayboxError;
pub use init::{InitPaymentRequest, InitPaymentResponse};
pub use outcome::Outcome;
pub use payment::{PaymentRecord, PaymentStatus};
pub use types::{Currency, InitStatus, Language, OnOff, RedirectUrlType, RequestMethod};
