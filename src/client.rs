use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{PayboxConfig, WireEncoding};
use crate::error::PayboxError;
use crate::init::{InitPaymentRequest, InitPaymentResponse};
use crate::outcome::Outcome;
use crate::payment::PaymentRecord;
use crate::sig;
use crate::types::{InitStatus, RequestMethod};

/// Endpoint script name; also the step identifier signed into both the
/// init request and the init response.
pub const INIT_SCRIPT_NAME: &str = "init_payment.php";

const SALT_LEN: usize = 15;

/// Client for the Paybox hosted-payment gateway.
///
/// Cheap to clone; the configuration is shared and immutable after
/// construction, so one client can serve concurrent requests.
#[derive(Clone)]
pub struct PayboxClient {
    config: Arc<PayboxConfig>,
    http_client: Client,
}

impl PayboxClient {
    pub fn new(config: PayboxConfig) -> Result<Self, PayboxError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PayboxError::Transport(e.to_string()))?;

        Ok(PayboxClient {
            config: Arc::new(config),
            http_client,
        })
    }

    pub fn from_env() -> Result<Self, PayboxError> {
        Self::new(PayboxConfig::from_env()?)
    }

    pub fn config(&self) -> &PayboxConfig {
        &self.config
    }

    /// Build a signed init request from the payment record.
    ///
    /// A fresh 15-character alphanumeric salt is generated per call, the
    /// result callback is requested over GET, and the signature is computed
    /// last so every other present field participates in it.
    pub fn build_init_request<P: PaymentRecord + ?Sized>(
        &self,
        payment: &P,
    ) -> Result<InitPaymentRequest, PayboxError> {
        let mut request = InitPaymentRequest::new(
            self.config.merchant_id,
            payment.token(),
            payment.total(),
            payment.description(),
            sig::random_salt(SALT_LEN),
        );

        let currency = payment.currency();
        if !currency.is_empty() {
            request.pg_currency = Some(currency.parse()?);
        }
        let email = payment.billing_email();
        if !email.is_empty() {
            request.pg_user_contact_email = Some(email);
        }

        request.pg_result_url = Some(parse_callback_url("process", &payment.process_url())?);
        request.pg_success_url = Some(parse_callback_url("success", &payment.success_url())?);
        request.pg_failure_url = Some(parse_callback_url("failure", &payment.failure_url())?);
        request.pg_request_method = Some(RequestMethod::GET);

        request.pg_site_url = Some(self.config.site_url.clone());
        request.pg_testing_mode = Some(self.config.testing_mode);

        request.validate()?;
        request.pg_sig = Some(sig::create_sig(&request, &self.config.secret, INIT_SCRIPT_NAME)?);

        debug!(
            order_id = %request.pg_order_id,
            amount = request.pg_amount,
            "built init request"
        );
        Ok(request)
    }

    /// POST the init request to the gateway and parse the XML response.
    ///
    /// The body encoding follows [`PayboxConfig::wire_encoding`]; non-2xx
    /// statuses and connection failures are `Transport` errors, anything
    /// wrong with the response body is `Parse`.
    pub async fn send(
        &self,
        request: &InitPaymentRequest,
    ) -> Result<InitPaymentResponse, PayboxError> {
        let url = format!("{}/{}", self.config.base_url, INIT_SCRIPT_NAME);
        let builder = match self.config.wire_encoding {
            WireEncoding::Json => self.http_client.post(&url).json(request),
            WireEncoding::Form => self.http_client.post(&url).form(request),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| PayboxError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PayboxError::Transport(format!(
                "gateway answered HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PayboxError::Transport(e.to_string()))?;
        InitPaymentResponse::from_xml(&body)
    }

    /// `send` wrapped in the bounded retry of [`PayboxConfig::retry`].
    ///
    /// Only transport failures are retried; the order id stays stable
    /// across attempts, which is the gateway's only idempotency anchor.
    pub async fn send_with_retry(
        &self,
        request: &InitPaymentRequest,
    ) -> Result<InitPaymentResponse, PayboxError> {
        let policy = self.config.retry;
        let mut attempt = 1;
        loop {
            match self.send(request).await {
                Err(err) if err.is_transport() && attempt < policy.max_attempts => {
                    warn!(
                        order_id = %request.pg_order_id,
                        attempt,
                        error = %err,
                        "transient transport failure, retrying"
                    );
                    tokio::time::sleep(policy.backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Recompute the response signature and compare with the carried one.
    pub fn verify_response(&self, response: &InitPaymentResponse) -> Result<bool, PayboxError> {
        let Some(carried) = response.pg_sig.as_deref() else {
            return Ok(false);
        };
        sig::check_sig(response, &self.config.secret, INIT_SCRIPT_NAME, carried)
    }

    /// Drive a payment from its record to a redirect instruction.
    ///
    /// Persists the record first if the collaborator reports it
    /// unpersisted, then build → send (with retry) → status and signature
    /// checks. A `pg_status` of `error` becomes a `Gateway` error carrying
    /// the gateway's code and description; error responses are not
    /// signature-checked. The returned [`Outcome::Redirect`] is a control
    /// outcome only — the hosting web layer issues the actual redirect.
    pub async fn initiate<P: PaymentRecord + ?Sized>(
        &self,
        payment: &mut P,
    ) -> Result<Outcome, PayboxError> {
        if !payment.is_persisted() {
            payment.persist().await?;
        }

        let request = self.build_init_request(payment)?;
        let response = self.send_with_retry(&request).await?;

        if response.pg_status == InitStatus::Error {
            let description = response
                .pg_error_description
                .clone()
                .unwrap_or_else(|| "gateway reported an error".to_string());
            warn!(
                order_id = %request.pg_order_id,
                code = ?response.pg_error_code,
                %description,
                "gateway rejected init request"
            );
            return Err(PayboxError::Gateway {
                code: response.pg_error_code.clone(),
                description,
            });
        }

        if !self.verify_response(&response)? {
            warn!(order_id = %request.pg_order_id, "init response signature mismatch");
            return Err(PayboxError::SignatureMismatch);
        }

        let redirect_url = response
            .pg_redirect_url
            .clone()
            .ok_or_else(|| PayboxError::Parse("ok response is missing pg_redirect_url".into()))?;

        info!(
            order_id = %request.pg_order_id,
            payment_id = ?response.pg_payment_id,
            "payment initiated, redirect needed"
        );
        Ok(Outcome::Redirect(redirect_url))
    }
}

fn parse_callback_url(which: &str, raw: &str) -> Result<Url, PayboxError> {
    Url::parse(raw)
        .map_err(|e| PayboxError::Validation(format!("{which} URL {raw:?} is invalid: {e}")))
}
