use factoryflow::testing::{sample_spec, test_client, test_config};
use factoryflow_server::{serve_with_shutdown, AppState};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    let state = Arc::new(AppState::new(
        Arc::new(test_client()),
        Arc::new(test_config().with_app_version("2.3.4.5")),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        serve_with_shutdown(listener, state, std::future::pending())
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

async fn create_pipeline(client: &reqwest::Client, base: &str) -> String {
    let body: Value = client
        .post(format!("{base}/pipeline"))
        .json(&sample_spec())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["pipeline_name"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_version_and_time() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let version: String = client
        .get(format!("{base}/version"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(version, "2.3.4.5");

    let time: String = client
        .get(format!("{base}/time"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(time.len(), "2024/01/01-00:00:00".len());
    assert_eq!(&time[4..5], "/");
    assert_eq!(&time[10..11], "-");
}

#[tokio::test]
async fn test_create_and_get_pipeline() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/pipeline"))
        .json(&sample_spec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["error"]["code"], 0);
    assert_eq!(created["error"]["source"], "factory_rest_api");
    let name = created["pipeline_name"].as_str().unwrap();
    assert!(name.starts_with("Pipeline"));
    assert_eq!(name.len(), "Pipeline".len() + 32);

    let response = client
        .get(format!("{base}/pipeline/{name}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["error"]["code"], 0);
    assert_eq!(fetched["columns"], serde_json::json!(["key", "phone", "email"]));
    assert_eq!(fetched["sink"]["file_pattern_or_name"], "output.csv");
    assert_eq!(
        fetched["source"]["folder_path"],
        "factory/n1/dataset-2024-01-01"
    );
}

#[tokio::test]
async fn test_get_missing_pipeline_is_404() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/pipeline/Pipeline0123"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["source"], "factory_rest_api");
    assert!(body["message"].as_str().unwrap().contains("Pipeline0123"));
}

#[tokio::test]
async fn test_run_and_poll() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let name = create_pipeline(&client, &base).await;

    let started: Value = client
        .post(format!("{base}/pipeline/{name}/run"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["error"]["code"], 0);
    assert_eq!(started["status"]["status"], "InProgress");
    let run_id = started["run_id"].as_str().unwrap();

    let polled: Value = client
        .get(format!("{base}/pipeline/{name}/run/{run_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(polled["error"]["code"], 0);
    assert_eq!(polled["status"]["status"], "Queued");
    assert_eq!(polled["run_id"], run_id);

    let foreign: Value = client
        .get(format!("{base}/pipeline/Pipelinedeadbeef/run/{run_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(foreign["error"]["code"], 6);
    assert_eq!(foreign["status"]["status"], "Failed");
}

#[tokio::test]
async fn test_run_unknown_pipeline_reports_code() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/pipeline/Pipeline0000/run"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], 5);
    assert_eq!(body["run_id"], "");
}

#[tokio::test]
async fn test_invalid_request_body_is_rejected() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/pipeline"))
        .json(&serde_json::json!({ "columns": ["key"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}
