//! Local stand-in for the analysis service.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};

pub struct StubAnalysis {
    pub upload_reply: Mutex<(StatusCode, String)>,
    pub statuses: Mutex<VecDeque<(StatusCode, Value)>>,
    pub fallback: Mutex<(StatusCode, Value)>,
    pub uploads: Mutex<Vec<String>>,
    pub status_calls: AtomicU32,
}

impl StubAnalysis {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            upload_reply: Mutex::new((StatusCode::OK, quick_analysis_body("session-1").to_string())),
            statuses: Mutex::new(VecDeque::new()),
            fallback: Mutex::new((StatusCode::OK, json!({"status": "processing"}))),
            uploads: Mutex::new(Vec::new()),
            status_calls: AtomicU32::new(0),
        })
    }

    pub fn reply_to_upload(&self, status: StatusCode, body: impl Into<String>) {
        *self.upload_reply.lock() = (status, body.into());
    }

    pub fn queue_status(&self, status: StatusCode, body: Value) {
        self.statuses.lock().push_back((status, body));
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Serves the stub on an ephemeral port and returns its base URL.
    pub async fn serve(self: &Arc<Self>) -> String {
        let app = Router::new()
            .route("/upload", post(upload))
            .route("/analysis/:session_id", get(analysis))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn upload(State(stub): State<Arc<StubAnalysis>>, mut multipart: Multipart) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let _ = field.bytes().await.unwrap();
            stub.uploads.lock().push(name);
        }
    }
    let (status, body) = stub.upload_reply.lock().clone();
    (status, [("content-type", "application/json")], body)
}

async fn analysis(
    State(stub): State<Arc<StubAnalysis>>,
    Path(_session_id): Path<String>,
) -> impl IntoResponse {
    stub.status_calls.fetch_add(1, Ordering::SeqCst);
    let next = stub.statuses.lock().pop_front();
    let (status, body) = next.unwrap_or_else(|| stub.fallback.lock().clone());
    (status, Json(body))
}

pub fn quick_analysis_body(session_id: &str) -> Value {
    json!({
        "session_id": session_id,
        "quick_analysis": {
            "rows": 250,
            "columns": 4,
            "column_names": ["a", "b", "c", "d"],
            "dtypes": {"a": "int64", "b": "float64", "c": "object", "d": "int64"},
            "memory_usage": "0.03 MB",
            "missing_values": {"a": 0, "b": 2, "c": 0, "d": 1}
        },
        "message": "processing",
        "status": "processing"
    })
}

pub fn visualizations() -> Value {
    json!([
        {
            "id": "1",
            "title": "Sales by region",
            "chart_type": "bar",
            "insight": "North leads",
            "parameters": {"x_axis": "c", "y_axis": "b"}
        },
        {
            "id": "2",
            "title": "Orders over time",
            "chart_type": "line",
            "insight": "Steady growth",
            "parameters": {"x_axis": "a", "y_axis": "d"}
        }
    ])
}

pub fn multipart_upload(uri: &str, file_name: &str, contents: &str) -> Request<Body> {
    let boundary = "sheet-dashboard-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{contents}\r\n--{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
