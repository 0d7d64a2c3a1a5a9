//! HTTP server standing in for remote services in tests.
//!
//! Requests have to be anticipated with [`Server::anticipate`] before they arrive. The test then
//! decides when and what to respond, which makes it possible to check ordering and concurrency
//! of the client under test.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_errors_doc)]

use http_body_util::{BodyExt, Full};
use hyper::{
    HeaderMap, Method, Request, Response, Uri,
    header::{CONTENT_TYPE, HeaderValue},
    server::conn::http1,
    service::Service,
};
use hyper_util::rt::TokioIo;
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

pub use hyper;
pub use hyper::{StatusCode, body::Bytes};

type MockResponse = Response<Full<Bytes>>;

#[derive(Default)]
struct State {
    /// Anticipated requests, by path. Requests to the same path are served in FIFO order.
    anticipated: HashMap<String, VecDeque<Anticipation>>,

    /// Requests which came without being anticipated.
    unexpected: Vec<String>,
}

struct Anticipation {
    request_tx: oneshot::Sender<RecordedRequest>,
    response_rx: oneshot::Receiver<MockResponse>,
}

/// Mock HTTP server bound to a random local port.
pub struct Server {
    port: u16,
    state: Arc<Mutex<State>>,
    accept_loop: JoinHandle<()>,
}

impl Server {
    /// Create new [`Server`], and bind it to a random port.
    pub async fn bind() -> Self {
        let state = Arc::new(Mutex::new(State::default()));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).await.expect("could not bind the mock");
        let port = listener.local_addr().unwrap().port();

        let accept_loop = tokio::spawn(accept_continuously(listener, Arc::clone(&state)));

        Self {
            port,
            state,
            accept_loop,
        }
    }

    /// Base URL of the server, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Anticipate a request to given path. Query string is not taken into account when matching.
    pub async fn anticipate(&self, path: impl Into<String>) -> AnticipatedRequest {
        let path = path.into();
        log::info!("Anticipating '{path}'.");

        let (request_tx, request_rx) = oneshot::channel();
        let (response_tx, response_rx) = oneshot::channel();

        self.state
            .lock()
            .unwrap()
            .anticipated
            .entry(path.clone())
            .or_default()
            .push_back(Anticipation {
                request_tx,
                response_rx,
            });

        AnticipatedRequest {
            path,
            request_rx: Some(request_rx),
            response_tx,
        }
    }

    /// Take the list of requests which were not anticipated, so they do not fail the test on drop.
    pub fn take_unexpected(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().unwrap().unexpected)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.accept_loop.abort();

        let unexpected = self.take_unexpected();
        if !unexpected.is_empty() && !std::thread::panicking() {
            panic!("there are unexpected requests: {unexpected:?}");
        }
    }
}

async fn accept_continuously(listener: TcpListener, state: Arc<Mutex<State>>) {
    loop {
        let (stream, _) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                log::warn!("Could not accept a connection: {error}.");
                continue;
            }
        };

        let service = MockService {
            state: Arc::clone(&state),
        };

        tokio::spawn(async move {
            if let Err(error) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::debug!("Connection closed: {error}.");
            }
        });
    }
}

/// Request which was anticipated by the test, but might not have arrived yet.
pub struct AnticipatedRequest {
    path: String,
    request_rx: Option<oneshot::Receiver<RecordedRequest>>,
    response_tx: oneshot::Sender<MockResponse>,
}

impl AnticipatedRequest {
    /// Wait until the request arrives.
    pub async fn expect(&mut self) -> RecordedRequest {
        log::info!("Waiting for '{}'.", self.path);
        self.request_rx
            .take()
            .expect("request was already expected")
            .await
            .expect("server went down before the request arrived")
    }

    /// Respond with 200 and given body.
    pub fn respond(self, payload: impl Into<Bytes>) {
        self.respond_with(StatusCode::OK, payload);
    }

    /// Respond with 200 and given JSON body.
    pub fn respond_json(self, payload: &serde_json::Value) {
        let mut response = Response::new(Full::new(Bytes::from(payload.to_string())));
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send(response);
    }

    /// Respond with given status and an empty body.
    pub fn respond_with_status(self, status: StatusCode) {
        self.respond_with(status, Bytes::new());
    }

    pub fn respond_with(self, status: StatusCode, payload: impl Into<Bytes>) {
        let mut response = Response::new(Full::new(payload.into()));
        *response.status_mut() = status;
        self.send(response);
    }

    fn send(self, response: MockResponse) {
        log::info!("Responding to '{}' with {}.", self.path, response.status());
        if self.response_tx.send(response).is_err() {
            log::warn!("Client of '{}' is gone.", self.path);
        }
    }
}

/// Request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl RecordedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not a JSON")
    }

    /// Value of a query parameter. Values are compared verbatim, without percent-decoding.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.uri.query()?.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }
}

struct MockService {
    state: Arc<Mutex<State>>,
}

impl Service<Request<hyper::body::Incoming>> for MockService {
    type Response = MockResponse;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<hyper::body::Incoming>) -> Self::Future {
        log::info!("Incoming {} '{}'.", request.method(), request.uri());
        let state = Arc::clone(&self.state);

        Box::pin(async move {
            let path = request.uri().path().to_owned();
            let anticipation = state
                .lock()
                .unwrap()
                .anticipated
                .get_mut(&path)
                .and_then(VecDeque::pop_front);

            let Some(anticipation) = anticipation else {
                log::warn!("Unexpected '{}'.", request.uri());
                state.lock().unwrap().unexpected.push(request.uri().to_string());

                let mut response = Response::new(Full::new(Bytes::from_static(b"unexpected")));
                *response.status_mut() = StatusCode::IM_A_TEAPOT;
                return Ok(response);
            };

            let (parts, body) = request.into_parts();
            let body = body.collect().await?.to_bytes();

            // Test might not be interested in the request itself.
            let _ = anticipation.request_tx.send(RecordedRequest {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });

            Ok(anticipation.response_rx.await.unwrap_or_else(|_| {
                let mut response =
                    Response::new(Full::new(Bytes::from_static(b"dropped without response")));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }))
        })
    }
}
