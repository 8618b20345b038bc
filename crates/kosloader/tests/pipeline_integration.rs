//! End-to-end run against a mocked KOS API.

use chrono::NaiveDate;
use kosloader::config::ApiConfig;
use kosloader::kos::{DomainError, KosError};
use kosloader::pipeline::run_with_client;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{api_config, client, page_body, parallel_json, API};

const PARALLELS: &str = "/timetables/parallel-classes";

async fn mount_semesters(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{API}/semesters")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                json!({"id": "S2", "nameCs": "Zima", "semesterStart": "2023-09-01", "semesterEnd": "2024-01-31"}),
                json!({"id": "S1", "nameCs": "Léto", "semesterStart": "2023-01-01", "semesterEnd": "2023-06-30"}),
            ],
            2,
        )))
        .mount(server)
        .await;
}

async fn mount_parallels(server: &MockServer, semester: &str, elements: Vec<Value>) {
    let total = elements.len() as u64;
    let first = elements.first().cloned().into_iter().collect();

    Mock::given(method("GET"))
        .and(path(format!("{API}{PARALLELS}")))
        .and(query_param("query", format!("semesterId=={semester}")))
        .and(query_param("size", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(first, total)))
        .expect(1)
        .mount(server)
        .await;

    if total > 0 {
        Mock::given(method("GET"))
            .and(path(format!("{API}{PARALLELS}")))
            .and(query_param("query", format!("semesterId=={semester}")))
            .and(query_param("page", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(elements, total)))
            .expect(1)
            .mount(server)
            .await;
    }
}

async fn mount_courses(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{API}/courses")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                json!({"id": 10, "code": "X1", "nameCs": "Intro"}),
                json!({"id": 11, "code": "X2", "nameCs": "Unused"}),
            ],
            2,
        )))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_writes_current_and_next_semester() {
    let server = MockServer::start().await;
    mount_semesters(&server).await;
    mount_parallels(&server, "S1", vec![parallel_json(1, 10, "S1")]).await;
    mount_parallels(&server, "S2", vec![]).await;
    mount_courses(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data.json");
    let config = api_config(&server);
    let client = client(&config);
    let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();

    let summary = run_with_client(&client, &config, &output, today).await.unwrap();

    assert_eq!(summary.current_semester, "S1");
    assert_eq!(summary.next_semester, "S2");
    assert_eq!(summary.current_courses, 1);
    assert_eq!(summary.next_courses, 0);

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        r#"{"S1":[{"code":"X1","name":"Intro","parallels":[{"can_register":true,"capacity":null,"is_full":false,"num":null,"occupied_places":null,"timetable":[],"type":"P"}]}],"S2":[]}"#
    );
}

#[tokio::test]
async fn test_run_spans_multiple_pages() {
    let server = MockServer::start().await;
    mount_semesters(&server).await;
    mount_courses(&server).await;
    mount_parallels(&server, "S2", vec![]).await;

    // 3 parallels in pages of 2
    Mock::given(method("GET"))
        .and(path(format!("{API}{PARALLELS}")))
        .and(query_param("query", "semesterId==S1"))
        .and(query_param("size", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![parallel_json(1, 10, "S1")], 3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}{PARALLELS}")))
        .and(query_param("query", "semesterId==S1"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![parallel_json(1, 10, "S1"), parallel_json(2, 11, "S1")],
            3,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{API}{PARALLELS}")))
        .and(query_param("query", "semesterId==S1"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![parallel_json(3, 10, "S1")], 3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data.json");
    let config = ApiConfig {
        page_size: 2,
        ..api_config(&server)
    };
    let client = client(&config);
    let today = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();

    let summary = run_with_client(&client, &config, &output, today).await.unwrap();
    assert_eq!(summary.current_courses, 2);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let courses = written["S1"].as_array().unwrap();
    assert_eq!(courses[0]["code"], "X1");
    assert_eq!(courses[0]["parallels"].as_array().unwrap().len(), 2);
    assert_eq!(courses[1]["code"], "X2");
    assert_eq!(courses[1]["parallels"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_without_current_semester_fails_before_downloading() {
    let server = MockServer::start().await;
    mount_semesters(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data.json");
    let config = api_config(&server);
    let client = client(&config);
    let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    let err = run_with_client(&client, &config, &output, today).await.unwrap_err();

    assert!(matches!(
        err,
        KosError::Domain(DomainError::NoCurrentSemester { .. })
    ));
    assert!(!output.exists());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
