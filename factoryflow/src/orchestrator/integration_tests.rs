//! End-to-end orchestration tests against the in-memory control plane, plus
//! failure injection through the mocked client.

use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{PipelineOrchestrator, RunOrchestrator};
use crate::client::{CreateRunResponse, MockFactoryClient, PipelineRun};
use crate::core::{Dataset, PipelineSpec, RunStatus};
use crate::errors::{ErrorCode, FactoryError};
use crate::identity::{compute_identity, ResourceNames};
use crate::testing::{sample_spec, test_config, wait_for_terminal, TestService, STORAGE_ACCOUNT};

fn scenario_spec() -> PipelineSpec {
    let rg = "datafactory-rg";
    PipelineSpec::new(
        Dataset::new(
            rg,
            STORAGE_ACCOUNT,
            "source",
            "factory/n1/dataset-2024-01-01",
            "input-00001.csv",
        ),
        Dataset::new(rg, STORAGE_ACCOUNT, "source", "factory/n1/join", "join.csv"),
        Dataset::new(rg, STORAGE_ACCOUNT, "sink", "consume/n1", "output-00001.csv"),
        vec!["key".to_string(), "phone".to_string(), "email".to_string()],
    )
}

fn mocked(mock: MockFactoryClient) -> PipelineOrchestrator {
    PipelineOrchestrator::new(Arc::new(mock), Arc::new(test_config()))
}

#[tokio::test]
async fn test_create_then_fetch_reconstructs_request() {
    let service = TestService::new();
    let spec = scenario_spec();
    let names = ResourceNames::new(&compute_identity(&spec));

    let created = service.pipelines.create_or_get(&spec).await;
    assert_eq!(created.error.code, ErrorCode::NoError);
    assert_eq!(created.pipeline_name, names.pipeline);
    assert_eq!(created.columns, spec.columns);

    assert_eq!(
        service.client.calls(),
        vec![
            format!("create_or_update_dataset:{}", names.source_dataset),
            format!("create_or_update_dataset:{}", names.join_dataset),
            format!("create_or_update_dataset:{}", names.sink_dataset),
            format!("create_or_update_data_flow:{}", names.data_flow),
            format!("create_or_update_pipeline:{}", names.pipeline),
        ]
    );

    let fetched = service.pipelines.fetch(&created.pipeline_name).await.unwrap();
    assert_eq!(fetched.error.code, ErrorCode::NoError);
    assert_eq!(fetched.columns, vec!["key", "phone", "email"]);
    assert_eq!(fetched.sink.file_pattern_or_name, "output.csv");
    assert_eq!(fetched.sink.folder_path, "consume/n1");
    assert_eq!(fetched.source.folder_path, "factory/n1/dataset-2024-01-01");
    assert_eq!(fetched.source.file_pattern_or_name, "input-00001.csv");
    assert_eq!(fetched.join, spec.join);
    assert_eq!(fetched.source.storage_account_name, STORAGE_ACCOUNT);
    assert_eq!(fetched.source.resource_group_name, "datafactory-rg");
}

#[tokio::test]
async fn test_source_dataset_stores_container_only() {
    let service = TestService::new();
    let spec = sample_spec();
    let created = service.pipelines.create_or_get(&spec).await;
    let names = ResourceNames::from_pipeline_name(&created.pipeline_name);

    let source = service.client.dataset(&names.source_dataset).unwrap();
    let location = source.properties.type_properties.location;
    assert_eq!(location.container.as_deref(), Some("source"));
    assert_eq!(location.folder_path.as_deref(), Some(""));
    assert_eq!(location.file_name.as_deref(), Some(""));

    let sink = service.client.dataset(&names.sink_dataset).unwrap();
    assert_eq!(
        sink.properties.linked_service_name.reference_name,
        service.config.sink_linked_service
    );
    let location = sink.properties.type_properties.location;
    assert_eq!(location.folder_path.as_deref(), Some("results"));
    assert_eq!(location.file_name.as_deref(), Some(""));
}

#[tokio::test]
async fn test_create_is_idempotent() {
    let service = TestService::new();
    let spec = sample_spec();

    let first = service.pipelines.create_or_get(&spec).await;
    let second = service.pipelines.create_or_get(&spec).await;

    assert_eq!(first.pipeline_name, second.pipeline_name);
    assert_eq!(service.client.pipeline_count(), 1);
}

#[tokio::test]
async fn test_fetch_unknown_pipeline_is_not_found() {
    let service = TestService::new();
    let err = service.pipelines.fetch("Pipeline0000").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_with_damaged_script_degrades() {
    let service = TestService::new();
    let created = service.pipelines.create_or_get(&sample_spec()).await;
    let names = ResourceNames::from_pipeline_name(&created.pipeline_name);
    service.client.set_script(&names.data_flow, "source() ~> Elsewhere");

    let fetched = service.pipelines.fetch(&created.pipeline_name).await.unwrap();
    assert_eq!(fetched.error.code, ErrorCode::NoError);
    assert!(fetched.columns.is_empty());
    assert_eq!(fetched.source.folder_path, "");
    assert_eq!(fetched.sink.file_pattern_or_name, "");
    assert_eq!(fetched.join.container_name, "reference");
}

#[tokio::test]
async fn test_fetch_failure_becomes_error_code() {
    let mut mock = MockFactoryClient::new();
    mock.expect_get_pipeline().returning(|_| {
        Err(FactoryError::Api {
            status: 500,
            message: "boom".to_string(),
        })
    });

    let fetched = mocked(mock).fetch("Pipelineabc").await.unwrap();
    assert_eq!(fetched.error.code, ErrorCode::PipelineGetException);
    assert!(fetched
        .error
        .message
        .starts_with("Exception while getting pipeline Pipelineabc: "));
    assert!(fetched.columns.is_empty());
    assert_eq!(fetched.source, Dataset::empty("datafactory-rg"));
}

#[tokio::test]
async fn test_empty_dataset_write_stops_sequence() {
    let mut mock = MockFactoryClient::new();
    mock.expect_create_or_update_dataset()
        .times(1)
        .returning(|_, _| Ok(None));
    mock.expect_create_or_update_data_flow().never();
    mock.expect_create_or_update_pipeline().never();

    let spec = sample_spec();
    let response = mocked(mock).create_or_get(&spec).await;
    assert_eq!(response.error.code, ErrorCode::DataFactoryError);
    assert_eq!(response.source, spec.source);
}

#[tokio::test]
async fn test_empty_data_flow_write_reports_dataflow_error() {
    let mut mock = MockFactoryClient::new();
    mock.expect_create_or_update_dataset()
        .times(3)
        .returning(|_, d| Ok(Some(d.clone())));
    mock.expect_create_or_update_data_flow()
        .times(1)
        .returning(|_, _| Ok(None));
    mock.expect_create_or_update_pipeline().never();

    let response = mocked(mock).create_or_get(&sample_spec()).await;
    assert_eq!(response.error.code, ErrorCode::DataflowCreationError);
    assert!(response.error.message.contains("DataFlow-"));
}

#[tokio::test]
async fn test_empty_pipeline_write_reports_pipeline_error() {
    let mut mock = MockFactoryClient::new();
    mock.expect_create_or_update_dataset()
        .times(3)
        .returning(|_, d| Ok(Some(d.clone())));
    mock.expect_create_or_update_data_flow()
        .returning(|_, f| Ok(Some(f.clone())));
    mock.expect_create_or_update_pipeline()
        .times(1)
        .returning(|_, _| Ok(None));

    let response = mocked(mock).create_or_get(&sample_spec()).await;
    assert_eq!(response.error.code, ErrorCode::PipelineCreationError);
}

#[tokio::test]
async fn test_remote_failure_during_creation_is_captured() {
    let mut mock = MockFactoryClient::new();
    mock.expect_create_or_update_dataset().returning(|_, _| {
        Err(FactoryError::Api {
            status: 403,
            message: "forbidden".to_string(),
        })
    });

    let response = mocked(mock).create_or_get(&sample_spec()).await;
    assert_eq!(response.error.code, ErrorCode::DataFactoryError);
    assert!(response.error.message.contains("forbidden"));
}

#[tokio::test]
async fn test_run_lifecycle_reaches_terminal_status() {
    let service = TestService::new();
    let created = service.pipelines.create_or_get(&sample_spec()).await;
    let name = created.pipeline_name;

    let started = service.runs.trigger(&name).await;
    assert_eq!(started.error.code, ErrorCode::NoError);
    assert_eq!(started.run_status(), RunStatus::InProgress);
    assert!(!started.run_id.is_empty());

    let run = service.client.run(&started.run_id).unwrap();
    let identity = ResourceNames::from_pipeline_name(&name).identity;
    assert_eq!(run.parameters["Pipeline_id"], identity.as_str());

    let allowed = [
        RunStatus::Pending,
        RunStatus::Queued,
        RunStatus::InProgress,
        RunStatus::Succeeded,
        RunStatus::Failed,
    ];
    let mut seen = Vec::new();
    for remote in ["Queued", "InProgress", "Canceling"] {
        service.client.set_run_status(&started.run_id, remote);
        let polled = service.runs.poll(&name, &started.run_id).await;
        assert_eq!(polled.error.code, ErrorCode::NoError);
        assert!(!polled.run_status().is_terminal());
        seen.push(polled.run_status());
    }

    service.client.complete_run(&started.run_id, "Succeeded", 1_500);
    let finished = wait_for_terminal(
        &service.runs,
        &name,
        &started.run_id,
        Duration::from_millis(1),
        3,
    )
    .await;
    seen.push(finished.run_status());

    assert!(seen.iter().all(|s| allowed.contains(s)));
    assert_eq!(finished.run_status(), RunStatus::Succeeded);
    assert_eq!(finished.status.duration, 1_500);
}

#[tokio::test]
async fn test_wait_for_terminal_gives_up_after_max_attempts() {
    let service = TestService::new();
    let created = service.pipelines.create_or_get(&sample_spec()).await;
    let started = service.runs.trigger(&created.pipeline_name).await;

    let last = wait_for_terminal(
        &service.runs,
        &created.pipeline_name,
        &started.run_id,
        Duration::from_millis(1),
        2,
    )
    .await;
    assert_eq!(last.run_status(), RunStatus::Queued);
    let polls = service
        .client
        .calls()
        .iter()
        .filter(|c| c.starts_with("get_pipeline_run:"))
        .count();
    assert_eq!(polls, 2);
}

#[tokio::test]
async fn test_trigger_unknown_pipeline_reports_exception() {
    let service = TestService::new();
    let response = service.runs.trigger("Pipeline0000").await;

    assert_eq!(response.run_status(), RunStatus::Failed);
    assert_eq!(response.error.code, ErrorCode::RunPipelineException);
    assert!(response.error.message.starts_with("Run pipeline exception: "));
    assert_eq!(response.run_id, "");
}

#[tokio::test]
async fn test_trigger_without_run_id_reports_run_error() {
    let mut mock = MockFactoryClient::new();
    mock.expect_create_run()
        .withf(|name, params| {
            name.to_string() == "Pipelineabc" && params["Pipeline_id"] == "abc"
        })
        .returning(|_, _| Ok(CreateRunResponse::default()));

    let response = RunOrchestrator::new(Arc::new(mock))
        .trigger("Pipelineabc")
        .await;
    assert_eq!(response.run_status(), RunStatus::Failed);
    assert_eq!(response.error.code, ErrorCode::RunPipelineError);
}

#[tokio::test]
async fn test_poll_with_foreign_identity_is_rejected() {
    let service = TestService::new();
    let created = service.pipelines.create_or_get(&sample_spec()).await;
    let started = service.runs.trigger(&created.pipeline_name).await;

    service.client.complete_run(&started.run_id, "Succeeded", 10);
    service.client.set_run_annotations(
        &started.run_id,
        Some(vec!["Pipeline_id:someoneelse".to_string()]),
    );

    let polled = service
        .runs
        .poll(&created.pipeline_name, &started.run_id)
        .await;
    let expected = ResourceNames::from_pipeline_name(&created.pipeline_name).identity;
    assert_eq!(polled.run_status(), RunStatus::Failed);
    assert_eq!(polled.error.code, ErrorCode::PipelineIdNotFound);
    assert_eq!(
        polled.error.message,
        format!("Pipeline id '{expected}' not found")
    );
    assert_eq!(polled.run_id, started.run_id);
}

#[tokio::test]
async fn test_poll_run_of_another_pipeline_is_rejected() {
    let service = TestService::new();
    let first = service.pipelines.create_or_get(&sample_spec()).await;
    let mut other_spec = sample_spec();
    other_spec.columns.push("zip".to_string());
    let second = service.pipelines.create_or_get(&other_spec).await;

    let started = service.runs.trigger(&first.pipeline_name).await;
    let polled = service
        .runs
        .poll(&second.pipeline_name, &started.run_id)
        .await;
    assert_eq!(polled.error.code, ErrorCode::PipelineIdNotFound);
}

#[tokio::test]
async fn test_poll_without_annotations_is_rejected() {
    let mut mock = MockFactoryClient::new();
    mock.expect_get_pipeline_run().returning(|id| {
        Ok(PipelineRun {
            run_id: id.to_string(),
            status: "Succeeded".to_string(),
            parameters: HashMap::from([("Pipeline_id".to_string(), "abc".to_string())]),
            ..PipelineRun::default()
        })
    });

    let polled = RunOrchestrator::new(Arc::new(mock))
        .poll("Pipelineabc", "r1")
        .await;
    assert_eq!(polled.error.code, ErrorCode::PipelineIdNotFound);
}

#[tokio::test]
async fn test_poll_without_annotations_rejects_empty_identity() {
    let mut mock = MockFactoryClient::new();
    mock.expect_get_pipeline_run().returning(|id| {
        Ok(PipelineRun {
            run_id: id.to_string(),
            status: "Succeeded".to_string(),
            ..PipelineRun::default()
        })
    });

    let polled = RunOrchestrator::new(Arc::new(mock)).poll("Pipeline", "r1").await;
    assert_eq!(polled.error.code, ErrorCode::PipelineIdNotFound);
    assert_eq!(polled.run_status(), RunStatus::Failed);
}

#[tokio::test]
async fn test_poll_unknown_run_reports_exception() {
    let service = TestService::new();
    let polled = service.runs.poll("Pipelineabc", "missing").await;

    assert_eq!(polled.run_status(), RunStatus::Failed);
    assert_eq!(polled.error.code, ErrorCode::RunPipelineException);
    assert_eq!(polled.run_id, "missing");
}
