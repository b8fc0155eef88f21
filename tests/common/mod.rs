#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use md5::{Digest, Md5};
use url::Url;

use paybox_rs::{PayboxConfig, PayboxError, PaymentRecord, PaymentStatus};

pub const MERCHANT_ID: i64 = 541;
pub const SECRET: &str = "s3cr3t";

/// Independent rendition of the gateway's signature algorithm, kept free
/// of the crate's own signing code so the tests catch algorithm drift.
pub fn reference_sig(fields: &[(&str, &str)], secret: &str, step_id: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);
    let mut string = step_id.to_string();
    for (name, value) in sorted {
        if *name == "pg_sig" || value.is_empty() {
            continue;
        }
        string.push(';');
        string.push_str(value);
    }
    string.push(';');
    string.push_str(secret);
    hex::encode(Md5::digest(string.as_bytes()))
}

/// In-memory payment record standing in for the caller's store.
pub struct MockPayment {
    pub token: String,
    pub total: i64,
    pub currency: String,
    pub description: String,
    pub billing_email: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<i64>,
    pub notes: Option<String>,
    pub persisted: bool,
    pub persist_calls: usize,
    /// When set, every mutator fails with this message.
    pub fail_mutations: Option<String>,
}

impl MockPayment {
    pub fn new(token: &str) -> Self {
        MockPayment {
            token: token.to_string(),
            total: 1000,
            currency: "KZT".to_string(),
            description: "Order #1".to_string(),
            billing_email: "buyer@example.com".to_string(),
            status: PaymentStatus::Pending,
            transaction_id: None,
            notes: None,
            persisted: true,
            persist_calls: 0,
            fail_mutations: None,
        }
    }

    fn mutation_guard(&self) -> Result<(), PayboxError> {
        match &self.fail_mutations {
            Some(message) => Err(PayboxError::Record(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentRecord for MockPayment {
    fn token(&self) -> String {
        self.token.clone()
    }

    fn total(&self) -> i64 {
        self.total
    }

    fn currency(&self) -> String {
        self.currency.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn billing_email(&self) -> String {
        self.billing_email.clone()
    }

    fn process_url(&self) -> String {
        format!("https://shop.example.com/payments/{}/process/", self.token)
    }

    fn success_url(&self) -> String {
        format!("https://shop.example.com/payments/{}/success/", self.token)
    }

    fn failure_url(&self) -> String {
        format!("https://shop.example.com/payments/{}/failure/", self.token)
    }

    fn status(&self) -> PaymentStatus {
        self.status
    }

    fn is_persisted(&self) -> bool {
        self.persisted
    }

    async fn persist(&mut self) -> Result<(), PayboxError> {
        self.mutation_guard()?;
        self.persisted = true;
        self.persist_calls += 1;
        Ok(())
    }

    async fn set_status(&mut self, status: PaymentStatus) -> Result<(), PayboxError> {
        self.mutation_guard()?;
        self.status = status;
        Ok(())
    }

    async fn set_transaction_id(&mut self, transaction_id: i64) -> Result<(), PayboxError> {
        self.mutation_guard()?;
        self.transaction_id = Some(transaction_id);
        Ok(())
    }

    async fn set_notes(&mut self, notes: &str) -> Result<(), PayboxError> {
        self.mutation_guard()?;
        self.notes = Some(notes.to_string());
        Ok(())
    }
}

/// One scripted answer from the mock gateway.
#[derive(Clone)]
pub enum Reply {
    Xml(String),
    Http(u16, String),
}

#[derive(Clone)]
struct GatewayState {
    script: Arc<Mutex<VecDeque<Reply>>>,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

#[derive(Clone)]
pub struct ReceivedRequest {
    pub content_type: String,
    pub body: String,
}

/// Mock Paybox gateway bound to an ephemeral local port, answering
/// `POST /init_payment.php` from a scripted reply queue.
pub struct MockGateway {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

impl MockGateway {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn spawn_gateway(script: Vec<Reply>) -> MockGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock gateway");
    let addr = listener.local_addr().expect("mock gateway addr");

    let state = GatewayState {
        script: Arc::new(Mutex::new(script.into())),
        hits: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let gateway = MockGateway {
        base_url: format!("http://{addr}"),
        hits: state.hits.clone(),
        requests: state.requests.clone(),
    };

    let app = Router::new()
        .route("/init_payment.php", post(init_payment))
        .with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock gateway serve");
    });

    gateway
}

async fn init_payment(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(ReceivedRequest {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        body,
    });

    let reply = state.script.lock().unwrap().pop_front();
    match reply {
        Some(Reply::Xml(xml)) => {
            ([(header::CONTENT_TYPE, "text/xml")], xml).into_response()
        }
        Some(Reply::Http(code, body)) => (
            StatusCode::from_u16(code).expect("scripted status code"),
            body,
        )
            .into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "script exhausted".to_string())
            .into_response(),
    }
}

/// Well-signed ok response, as the gateway would answer a valid init
/// request.
pub fn signed_ok_response(redirect_url: &str) -> Reply {
    let payment_id = "4567788";
    let salt = "HCsNLNBrdKyAOcqx";
    let sig = reference_sig(
        &[
            ("pg_status", "ok"),
            ("pg_payment_id", payment_id),
            ("pg_redirect_url", redirect_url),
            ("pg_salt", salt),
        ],
        SECRET,
        "init_payment.php",
    );
    Reply::Xml(format!(
        "<response>\
         <pg_status>ok</pg_status>\
         <pg_payment_id>{payment_id}</pg_payment_id>\
         <pg_redirect_url>{redirect_url}</pg_redirect_url>\
         <pg_salt>{salt}</pg_salt>\
         <pg_sig>{sig}</pg_sig>\
         </response>"
    ))
}

pub fn error_response(code: &str, description: &str) -> Reply {
    Reply::Xml(format!(
        "<response>\
         <pg_status>error</pg_status>\
         <pg_error_code>{code}</pg_error_code>\
         <pg_error_description>{description}</pg_error_description>\
         </response>"
    ))
}

/// Ok response whose signature does not match its fields.
pub fn tampered_ok_response(redirect_url: &str) -> Reply {
    Reply::Xml(format!(
        "<response>\
         <pg_status>ok</pg_status>\
         <pg_payment_id>4567788</pg_payment_id>\
         <pg_redirect_url>{redirect_url}</pg_redirect_url>\
         <pg_salt>HCsNLNBrdKyAOcqx</pg_salt>\
         <pg_sig>00000000000000000000000000000000</pg_sig>\
         </response>"
    ))
}

/// Config pointed at the mock gateway, with a fast retry policy so the
/// exhaustion tests stay quick.
pub fn test_config(gateway: &MockGateway) -> PayboxConfig {
    let mut config = PayboxConfig::new(
        MERCHANT_ID,
        SECRET,
        Url::parse("https://shop.example.com").unwrap(),
    );
    config.base_url = gateway.base_url.clone();
    config.retry.backoff = Duration::from_millis(10);
    config
}
