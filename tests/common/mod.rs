//! Shared fixtures for the integration suites: a tracing guard, a scripted
//! in-memory transport, and a typical success/failure envelope.

#![allow(dead_code)]

use restbind::envelope::ResponseEnvelope;
use restbind::error::ClientError;
use restbind::spi::RequestBody;
use restbind::transport::{DecodedEntity, Transport};
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self { _guard: guard }
    }
}

/// One request as the mock transport saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub method: http::Method,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
}

/// Transport double: records every request and replays scripted responses in
/// order.
pub struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<Result<DecodedEntity, ClientError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_response(&self, response: Result<DecodedEntity, ClientError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(Ok(DecodedEntity {
            status,
            body: Some(body),
        }));
    }

    pub fn push_empty(&self, status: u16) {
        self.push_response(Ok(DecodedEntity { status, body: None }));
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

impl Transport for MockTransport {
    fn execute(
        &self,
        url: &str,
        method: &http::Method,
        headers: &BTreeMap<String, String>,
        body: &RequestBody,
    ) -> Result<DecodedEntity, ClientError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            method: method.clone(),
            headers: headers.clone(),
            body: body.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock transport ran out of scripted responses")
    }
}

/// The usual service envelope: zero code means success.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_none")]
    pub data: Option<T>,
}

fn default_none<T>() -> Option<T> {
    None
}

impl<T> ResponseEnvelope<T> for ApiEnvelope<T> {
    fn is_failed(&self) -> bool {
        self.code != 0
    }

    fn data(self) -> Option<T> {
        self.data
    }
}
