#![allow(dead_code)]

use std::time::Duration;

use kosloader::config::ApiConfig;
use kosloader::kos::{KosClient, KosSession};
use serde_json::{json, Value};
use url::Url;
use wiremock::MockServer;

pub const API: &str = "/rest/api";

/// Config pointing at `server`, without any scheduling delays.
pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        stagger: Duration::ZERO,
        max_jitter: Duration::ZERO,
        ..ApiConfig::default()
    }
}

/// Client that skips the login handshake.
pub fn client(config: &ApiConfig) -> KosClient {
    KosClient::new(KosSession::new(config).unwrap())
}

pub fn page_body(elements: Vec<Value>, total: u64) -> Value {
    let size = elements.len();
    json!({
        "elements": elements,
        "page": {"size": size, "totalElements": total, "number": 0},
    })
}

pub fn parallel_json(id: i64, course_id: i64, semester: &str) -> Value {
    json!({
        "id": id,
        "courseView": {"id": course_id},
        "semester": {"id": semester},
        "parallelType": {"code": "P"},
        "timetable": [],
    })
}
