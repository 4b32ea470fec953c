// In-process mock tracker for client integration tests.
//
// Every request is recorded (method, path, query, headers, and multipart
// parts when the body is multipart) and answered with one canned reply.

#![allow(dead_code)]

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Part {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub parts: Vec<Part>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "text/plain",
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::text(status, "")
    }
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    log: Arc<Mutex<Vec<Recorded>>>,
}

/// A running mock tracker on 127.0.0.1 with a random port.
pub struct MockTracker {
    pub base_url: String,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl MockTracker {
    /// Spawn on the current tokio runtime.
    pub async fn start(reply: Reply) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let base_url = serve(reply, log.clone()).await;
        Self { base_url, log }
    }

    /// Spawn on a background thread with its own runtime, for blocking
    /// clients that cannot run inside another runtime. The server stays
    /// alive for the rest of the test process.
    pub fn start_in_background(reply: Reply) -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        let server_log = log.clone();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let base_url = serve(reply, server_log).await;
                tx.send(base_url).unwrap();
                std::future::pending::<()>().await;
            });
        });
        let base_url = rx.recv().unwrap();
        Self { base_url, log }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// The single request the tracker received.
    pub fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(
            requests.len(),
            1,
            "expected exactly one request: {requests:?}"
        );
        requests.into_iter().next().unwrap()
    }
}

async fn serve(reply: Reply, log: Arc<Mutex<Vec<Recorded>>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .fallback(record_and_reply)
        .with_state(MockState { reply, log });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn record_and_reply(State(state): State<MockState>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(String::from);
    let headers = request.headers().clone();

    let is_multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let mut parts = Vec::new();
    if is_multipart {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .expect("multipart body");
        while let Some(field) = multipart.next_field().await.expect("multipart field") {
            let name = field.name().map(String::from);
            let file_name = field.file_name().map(String::from);
            let data = field.bytes().await.expect("multipart data");
            parts.push(Part {
                name,
                file_name,
                data,
            });
        }
    }

    state.log.lock().unwrap().push(Recorded {
        method,
        path,
        query,
        headers,
        parts,
    });

    let reply = state.reply.clone();
    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}

/// Accept one connection, read the request head and hand the socket to
/// `respond`, which writes the raw HTTP response. Used for bodies axum
/// cannot produce: slow, stalled or shorter than their `Content-Length`.
pub async fn raw_server<F, Fut>(respond: F) -> String
where
    F: FnOnce(TcpStream) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            head.extend_from_slice(&buf[..n]);
        }
        respond(stream).await;
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub const UPLOAD_RESPONSE: &str = r#"[{
    "id": "10001",
    "filename": "test.txt",
    "author": {"displayName": "Test User", "accountId": "123"},
    "created": "2020-12-03T14:05:20.974+0100",
    "size": 12,
    "mimeType": "text/plain",
    "content": "http://example.com/attachment/10001"
}]"#;

pub const ISSUE_RESPONSE: &str = r#"{
    "key": "TEST-1",
    "fields": {
        "attachment": [
            {
                "id": "10001",
                "filename": "document.pdf",
                "author": {"displayName": "John Doe", "accountId": "123"},
                "created": "2020-12-01T10:00:00.000+0100",
                "size": 1048576,
                "mimeType": "application/pdf",
                "content": "https://example.com/attachment/10001"
            },
            {
                "id": "10002",
                "filename": "screenshot.png",
                "author": {"displayName": "Jane Smith", "accountId": "456"},
                "created": "2020-12-02T15:30:00.000+0100",
                "size": 524288,
                "mimeType": "image/png",
                "content": "https://example.com/attachment/10002"
            }
        ]
    }
}"#;
