//! Integration tests for Tienda.
//!
//! Tests run the storefront library against [`FakeCms`], an in-process
//! stand-in for the CMS query API, so no network access or credentials are
//! needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tienda_storefront::config::CmsConfig;
use tokio::task::JoinHandle;

/// One request received by the fake CMS.
#[derive(Debug, Clone)]
pub struct CmsRequest {
    pub api_version: String,
    pub dataset: String,
    /// GROQ query text.
    pub query: String,
    /// `$`-prefixed parameters, decoded from JSON and keyed without the `$`.
    pub params: HashMap<String, Value>,
    pub authorization: Option<String>,
}

impl CmsRequest {
    /// A parameter as a string, if present and a JSON string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }
}

/// What the fake CMS answers with.
#[derive(Debug, Clone)]
pub struct CmsReply {
    pub status: StatusCode,
    pub body: Value,
    pub retry_after: Option<u64>,
}

impl CmsReply {
    /// Successful query with this `result`.
    #[must_use]
    pub fn result(result: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({ "ms": 3, "query": "", "result": result }),
            retry_after: None,
        }
    }

    /// Query API error body.
    #[must_use]
    pub fn error(status: StatusCode, description: &str) -> Self {
        Self {
            status,
            body: json!({
                "error": { "description": description, "type": "queryParseError" }
            }),
            retry_after: None,
        }
    }

    /// `429 Too Many Requests` with a `Retry-After` header.
    #[must_use]
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: json!({ "error": { "description": "Rate limit exceeded" } }),
            retry_after: Some(retry_after),
        }
    }
}

type Responder = dyn Fn(&CmsRequest) -> CmsReply + Send + Sync;

struct FakeCmsInner {
    responder: Box<Responder>,
    requests: Mutex<Vec<CmsRequest>>,
    hits: AtomicUsize,
}

/// In-process fake of the CMS query API.
///
/// Serves `GET /{version}/data/query/{dataset}` on an ephemeral port and
/// answers each request with the responder's reply. The server stops when
/// the value is dropped.
pub struct FakeCms {
    addr: SocketAddr,
    inner: Arc<FakeCmsInner>,
    server: JoinHandle<()>,
}

impl FakeCms {
    /// Start a fake answering every request with `responder`.
    pub async fn start(
        responder: impl Fn(&CmsRequest) -> CmsReply + Send + Sync + 'static,
    ) -> Self {
        let inner = Arc::new(FakeCmsInner {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/{version}/data/query/{dataset}", get(handle_query))
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            inner,
            server,
        }
    }

    /// Base URL to use as the API host.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// CMS configuration pointing at this fake.
    #[must_use]
    pub fn config(&self) -> CmsConfig {
        let mut config = CmsConfig::new("test", "production");
        config.api_host = Some(self.url());
        config
    }

    /// Number of requests served.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.inner.hits.load(Ordering::SeqCst)
    }

    /// Every request served so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<CmsRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeCms {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle_query(
    State(inner): State<Arc<FakeCmsInner>>,
    Path((api_version, dataset)): Path<(String, String)>,
    Query(raw): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let params = raw
        .iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix('$')?;
            let decoded =
                serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            Some((name.to_string(), decoded))
        })
        .collect();

    let request = CmsRequest {
        api_version,
        dataset,
        query: raw.get("query").cloned().unwrap_or_default(),
        params,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let reply = (inner.responder)(&request);
    inner.hits.fetch_add(1, Ordering::SeqCst);
    inner.requests.lock().unwrap().push(request);

    let mut response = (reply.status, Json(reply.body)).into_response();
    if let Some(secs) = reply.retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, secs.to_string().parse().unwrap());
    }
    response
}

/// A product document as the CMS returns it.
#[must_use]
pub fn product_doc(id: &str, name: &str, slug: &str, price: f64) -> Value {
    json!({
        "_id": id,
        "_type": "product",
        "name": name,
        "slug": { "_type": "slug", "current": slug },
        "price": price,
    })
}

/// Fresh, empty directory under the system temp dir.
#[must_use]
pub fn temp_data_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tienda-{label}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
