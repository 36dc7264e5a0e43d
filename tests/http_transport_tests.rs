//! Round-trip tests of the default `reqwest` transport against a local
//! `tiny_http` mock server.

mod common;

use common::TestTracing;
use http::Method;
use restbind::context::RequestContext;
use restbind::error::ClientError;
use restbind::meta::{EndpointConfig, FieldKind, FieldSpec};
use restbind::spi::{ErrorReceiver, RequestMatcher, ResponseSnapshot};
use restbind::template::CallArg;
use restbind::RestClient;
use serde::Deserialize;
use serde_json::json;
use std::io::Read;
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Response, Server};
use url::Url;

#[derive(Debug, Clone)]
struct Received {
    method: String,
    url: String,
    body: String,
    content_type: Option<String>,
}

struct TestServer {
    host: String,
    received: Arc<Mutex<Vec<Received>>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl TestServer {
    /// Serve the scripted `(status, body)` responses in order, one request
    /// each, then shut down.
    fn start(responses: Vec<(u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind test server");
        let port = server
            .server_addr()
            .to_ip()
            .expect("test server ip address")
            .port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_in_thread = Arc::clone(&received);
        let handle = std::thread::spawn(move || {
            for (status, body) in responses {
                let mut request = match server.recv() {
                    Ok(request) => request,
                    Err(_) => return,
                };
                let mut request_body = String::new();
                let _ = request.as_reader().read_to_string(&mut request_body);
                let content_type = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_string());
                received_in_thread.lock().unwrap().push(Received {
                    method: request.method().to_string().to_uppercase(),
                    url: request.url().to_string(),
                    body: request_body,
                    content_type,
                });
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .expect("content type header"),
                    );
                let _ = request.respond(response);
            }
        });
        Self {
            host: format!("http://127.0.0.1:{port}"),
            received,
            handle: Some(handle),
        }
    }

    fn requests(&mut self) -> Vec<Received> {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.received.lock().unwrap().clone()
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Pet {
    id: i64,
    name: String,
}

#[test]
fn test_get_round_trip() {
    let _tracing = TestTracing::init();
    let mut server = TestServer::start(vec![(
        200,
        json!({"id": 12345, "name": "Max"}).to_string(),
    )]);
    let client = RestClient::builder("pet-store")
        .host(&server.host)
        .endpoint(
            EndpointConfig::new("get_pet", Method::GET, "/pets/{id}")
                .param_spec("id", true, FieldSpec::new(FieldKind::PathVariable))
                .param("include", true),
        )
        .build()
        .unwrap();

    let pet: Option<Pet> = client
        .invoke_plain(
            "get_pet",
            &[CallArg::of(&12345).unwrap(), CallArg::of(&"stats").unwrap()],
        )
        .unwrap();

    assert_eq!(
        pet,
        Some(Pet {
            id: 12345,
            name: "Max".to_string()
        })
    );
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/pets/12345?include=stats");
    assert!(requests[0].body.is_empty());
}

#[test]
fn test_post_sends_json_body() {
    let _tracing = TestTracing::init();
    let mut server = TestServer::start(vec![(
        201,
        json!({"id": 67890, "name": "Bella"}).to_string(),
    )]);
    let client = RestClient::builder("pet-store")
        .host(&server.host)
        .endpoint(EndpointConfig::new("add_pet", Method::POST, "/pets").param("pet", false))
        .build()
        .unwrap();

    let created: Option<Pet> = client
        .invoke_plain(
            "add_pet",
            &[CallArg::of(&json!({"name": "Bella", "species": "Cat"})).unwrap()],
        )
        .unwrap();

    assert_eq!(created.map(|p| p.id), Some(67890));
    let requests = server.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json")
    );
    let sent: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent, json!({"name": "Bella", "species": "Cat"}));
}

#[test]
fn test_non_2xx_propagates_transport_fault() {
    let _tracing = TestTracing::init();
    let mut server = TestServer::start(vec![(404, json!({"error": "no such pet"}).to_string())]);
    let client = RestClient::builder("pet-store")
        .host(&server.host)
        .endpoint(
            EndpointConfig::new("get_pet", Method::GET, "/pets/{id}").param_spec(
                "id",
                true,
                FieldSpec::new(FieldKind::PathVariable),
            ),
        )
        .build()
        .unwrap();

    let err = client
        .invoke_plain::<Pet>("get_pet", &[CallArg::of(&1).unwrap()])
        .unwrap_err();
    match err {
        ClientError::Transport(fault) => {
            assert_eq!(fault.status, Some(404));
            assert!(fault.body.unwrap().contains("no such pet"));
        }
        other => panic!("expected transport fault, got {other}"),
    }
    assert_eq!(server.requests().len(), 1);
}

struct AbsorbingReceiver {
    matcher: RequestMatcher,
    seen_status: Mutex<Option<u16>>,
}

impl ErrorReceiver for AbsorbingReceiver {
    fn request_to_handle(&self) -> &RequestMatcher {
        &self.matcher
    }

    fn handle(
        &self,
        _url: &Url,
        _method: &Method,
        response: &ResponseSnapshot,
        _ctx: &RequestContext,
    ) -> bool {
        *self.seen_status.lock().unwrap() = response.status;
        true
    }
}

#[test]
fn test_matched_receiver_turns_404_into_none() {
    let _tracing = TestTracing::init();
    let mut server = TestServer::start(vec![(404, json!({"error": "gone"}).to_string())]);
    let receiver = Arc::new(AbsorbingReceiver {
        matcher: RequestMatcher::new("/pets/{id}", Method::GET).unwrap(),
        seen_status: Mutex::new(None),
    });
    let client = RestClient::builder("pet-store")
        .host(&server.host)
        .error_receiver(Arc::clone(&receiver) as Arc<dyn ErrorReceiver>)
        .endpoint(
            EndpointConfig::new("get_pet", Method::GET, "/pets/{id}").param_spec(
                "id",
                true,
                FieldSpec::new(FieldKind::PathVariable),
            ),
        )
        .build()
        .unwrap();

    let pet: Option<Pet> = client
        .invoke_plain("get_pet", &[CallArg::of(&1).unwrap()])
        .unwrap();
    assert!(pet.is_none());
    assert_eq!(*receiver.seen_status.lock().unwrap(), Some(404));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_empty_body_yields_none() {
    let _tracing = TestTracing::init();
    let mut server = TestServer::start(vec![(200, String::new())]);
    let client = RestClient::builder("pet-store")
        .host(&server.host)
        .endpoint(
            EndpointConfig::new("delete_pet", Method::DELETE, "/pets/{id}").param_spec(
                "id",
                true,
                FieldSpec::new(FieldKind::PathVariable),
            ),
        )
        .build()
        .unwrap();

    let result: Option<serde_json::Value> = client
        .invoke_plain("delete_pet", &[CallArg::of(&9).unwrap()])
        .unwrap();
    assert!(result.is_none());
    let requests = server.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert!(requests[0].body.is_empty());
}

#[test]
fn test_form_urlencoded_body() {
    let _tracing = TestTracing::init();
    let mut server = TestServer::start(vec![(200, json!({"ok": true}).to_string())]);
    let client = RestClient::builder("auth")
        .host(&server.host)
        .endpoint(
            EndpointConfig::new("login", Method::POST, "/login")
                .content_type("application/x-www-form-urlencoded")
                .param("user", true)
                .param("password", true),
        )
        .build()
        .unwrap();

    let _r: Option<serde_json::Value> = client
        .invoke_plain(
            "login",
            &[CallArg::of(&"ada").unwrap(), CallArg::of(&"s3cret").unwrap()],
        )
        .unwrap();
    let requests = server.requests();
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(requests[0].body, "password=s3cret&user=ada");
}
