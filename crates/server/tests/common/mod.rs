//! Common test utilities for driving the server in-process.
//!
//! The fixture wires the real router to a scriptable mock vision client, so
//! tests cover the full HTTP surface without external infrastructure.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use glimpse_core::testing::MockVisionClient;
use glimpse_core::{
    Config, ContentModerator, ImageProcessor, LimitsConfig, MemoryTaskStore, ServerConfig,
    TasksConfig, TaskStore, VisionConfig,
};
use glimpse_server::api::create_router;
use glimpse_server::state::AppState;

/// Upload limits used by the fixture: 2 MiB async, 1 MiB sync. Small enough
/// that oversize tests stay cheap.
pub const TEST_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const TEST_MAX_SYNC_UPLOAD_BYTES: usize = 1024 * 1024;

/// Test fixture with a mock vision backend.
pub struct TestFixture {
    /// The axum router under test
    pub router: Router,
    /// Mock vision client: script replies and errors here
    pub vision: Arc<MockVisionClient>,
    /// Shared task store, for direct assertions
    pub tasks: Arc<dyn TaskStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// One part of a multipart body.
pub enum Part<'a> {
    File {
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

impl TestFixture {
    pub fn new() -> Self {
        let vision = Arc::new(MockVisionClient::new());

        let config = Config {
            vision: VisionConfig {
                base_url: "http://127.0.0.1:1/v1".to_string(),
                model: "mock-vl".to_string(),
                api_key: Some("test-key".to_string()),
                timeout_secs: 5,
                temperature: 0.3,
            },
            server: ServerConfig {
                host: IpAddr::from([127, 0, 0, 1]),
                port: 0,
            },
            limits: LimitsConfig {
                max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
                max_sync_upload_bytes: TEST_MAX_SYNC_UPLOAD_BYTES,
            },
            tasks: TasksConfig { max_records: 100 },
        };

        let tasks: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::with_max_records(100));
        let processor = Arc::new(ImageProcessor::new(
            Arc::clone(&vision) as Arc<dyn glimpse_core::VisionClient>
        ));
        let moderator = Arc::new(ContentModerator::new(
            Arc::clone(&vision) as Arc<dyn glimpse_core::VisionClient>
        ));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&tasks),
            processor,
            moderator,
        ));

        Self {
            router: create_router(state),
            vision,
            tasks,
        }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::builder().method("GET").uri(path), Body::empty())
            .await
    }

    /// Send a GET request and return the raw body text (non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(
            Request::builder().method("DELETE").uri(path),
            Body::empty(),
        )
        .await
    }

    /// Send a POST request with a JSON body.
    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("Content-Type", "application/json"),
            Body::from(serde_json::to_vec(&body).unwrap()),
        )
        .await
    }

    /// Send a POST request with a multipart body built from `parts`.
    pub async fn post_multipart(&self, path: &str, parts: &[Part<'_>]) -> TestResponse {
        let boundary = "glimpse-test-boundary";
        let body = build_multipart_body(boundary, parts);

        self.request(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                ),
            Body::from(body),
        )
        .await
    }

    /// Upload one file to the given path.
    pub async fn upload(
        &self,
        path: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        self.post_multipart(
            path,
            &[Part::File {
                filename,
                content_type,
                bytes,
            }],
        )
        .await
    }

    /// Poll `/status/{task_id}` until the task reaches a terminal status.
    pub async fn poll_until_terminal(&self, task_id: &str) -> TestResponse {
        for _ in 0..200 {
            let response = self.get(&format!("/status/{task_id}")).await;
            let status = response.body["data"]["status"].as_str().unwrap_or_default();
            if status == "completed" || status == "failed" {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {task_id} did not reach a terminal status in time");
    }

    async fn request(
        &self,
        builder: axum::http::request::Builder,
        body: Body,
    ) -> TestResponse {
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn build_multipart_body(boundary: &str, parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match part {
            Part::File {
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// A small stand-in JPEG payload (content is never inspected server-side).
pub fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(len.max(4), 0x42);
    bytes
}

/// A model reply shaped like a moderation verdict.
pub fn verdict_json(is_safe: bool, risk: &str, category: &str) -> String {
    format!(
        r#"{{"is_safe": {is_safe}, "risk_level": "{risk}", "categories": ["{category}"], "reasons": ["scripted"], "confidence": 0.9, "description": "scripted verdict"}}"#
    )
}
