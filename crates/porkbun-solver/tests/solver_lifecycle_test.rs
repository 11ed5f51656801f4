//! End-to-end present / clean up against a mocked Porkbun API

use std::sync::Arc;

use porkbun_solver::{
    ChallengeRequest, ChallengeSolver, InMemorySecretStore, PorkbunProviderFactory,
    PorkbunSolver, SolverContext, SolverError, SolverErrorKind, SolverSettings,
};
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NAMESPACE: &str = "cert-manager";
const SECRET_NAME: &str = "cert-manager-porkbun-webhook-secret";

fn challenge(key: &str) -> ChallengeRequest {
    ChallengeRequest {
        domain_zone: "example.com.".to_string(),
        resolved_fqdn: "_acme-challenge.example.com.".to_string(),
        key: key.to_string(),
        namespace: NAMESPACE.to_string(),
        config: Some(serde_json::json!({
            "secretNameRef": SECRET_NAME,
            "apiKeySecretRef": "api-key",
            "secretKeySecretRef": "secret-key"
        })),
        ..Default::default()
    }
}

async fn solver_with_secret(
    mock_server: &MockServer,
    fields: &[(&str, &str)],
) -> PorkbunSolver {
    let secrets = InMemorySecretStore::new().with_secret(
        NAMESPACE,
        SECRET_NAME,
        fields.iter().map(|(k, v)| (k.to_string(), v.to_string())),
    );
    let context = SolverContext::new(
        Arc::new(secrets),
        Arc::new(PorkbunProviderFactory::new(mock_server.uri())),
    );

    let mut solver = PorkbunSolver::new();
    solver.initialize(context).await.unwrap();
    solver
}

fn retrieve_response(records: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "SUCCESS",
        "records": records
    }))
}

fn challenge_record(id: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": "_acme-challenge.example.com",
        "type": "TXT",
        "content": content,
        "ttl": "60",
        "prio": "0",
        "notes": ""
    })
}

#[tokio::test]
async fn test_present_then_clean_up_round_trip() {
    let mock_server = MockServer::start().await;

    // Before present: nothing there
    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(retrieve_response(serde_json::json!([])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dns/create/example.com"))
        .and(body_partial_json(serde_json::json!({
            "apikey": "pk1_test",
            "secretapikey": "sk1_test",
            "name": "_acme-challenge",
            "type": "TXT",
            "content": "token",
            "ttl": "60"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SUCCESS",
            "id": 555
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Before clean up: the record we created
    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(retrieve_response(serde_json::json!([challenge_record(
            "555", "token"
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dns/delete/example.com/555"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SUCCESS"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let solver = solver_with_secret(
        &mock_server,
        &[("api-key", "pk1_test"), ("secret-key", "sk1_test")],
    )
    .await;

    solver.present(&challenge("token")).await.unwrap();
    solver.clean_up(&challenge("token")).await.unwrap();
}

#[tokio::test]
async fn test_repeated_present_creates_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(retrieve_response(serde_json::json!([])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(retrieve_response(serde_json::json!([challenge_record(
            "777", "token"
        )])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dns/create/example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "SUCCESS",
            "id": 777
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let solver = solver_with_secret(
        &mock_server,
        &[("api-key", "pk1_test"), ("secret-key", "sk1_test")],
    )
    .await;

    solver.present(&challenge("token")).await.unwrap();
    solver.present(&challenge("token")).await.unwrap();
}

#[tokio::test]
async fn test_clean_up_without_record_only_lists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(retrieve_response(serde_json::json!([challenge_record(
            "1", "some-other-token"
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("^/dns/(create|delete)/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let solver = solver_with_secret(
        &mock_server,
        &[("api-key", "pk1_test"), ("secret-key", "sk1_test")],
    )
    .await;

    solver.clean_up(&challenge("token")).await.unwrap();
}

#[tokio::test]
async fn test_missing_api_key_field_makes_no_provider_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let solver = solver_with_secret(&mock_server, &[("secret-key", "sk1_test")]).await;

    for result in [
        solver.present(&challenge("token")).await,
        solver.clean_up(&challenge("token")).await,
    ] {
        match result.unwrap_err() {
            SolverError::SecretFieldMissing { field, .. } => assert_eq!(field, "api-key"),
            other => panic!("Expected SecretFieldMissing, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_malformed_record_id_blocks_delete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(retrieve_response(serde_json::json!([challenge_record(
            "not-a-number",
            "token"
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("^/dns/delete/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let solver = solver_with_secret(
        &mock_server,
        &[("api-key", "pk1_test"), ("secret-key", "sk1_test")],
    )
    .await;

    let err = solver.clean_up(&challenge("token")).await.unwrap_err();
    assert_eq!(err.kind(), SolverErrorKind::MalformedRecordId);
}

#[tokio::test]
async fn test_provider_error_is_reported_as_list_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "ERROR",
            "message": "Invalid API key. (002)"
        })))
        .mount(&mock_server)
        .await;

    let solver = solver_with_secret(
        &mock_server,
        &[("api-key", "pk1_wrong"), ("secret-key", "sk1_wrong")],
    )
    .await;

    let err = solver.present(&challenge("token")).await.unwrap_err();
    assert_eq!(err.kind(), SolverErrorKind::ProviderList);
}

#[tokio::test]
async fn test_settings_wire_file_secrets_and_api_url() {
    let mock_server = MockServer::start().await;
    let secrets_dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(secrets_dir.path().join(NAMESPACE)).unwrap();
    std::fs::write(
        secrets_dir
            .path()
            .join(NAMESPACE)
            .join(format!("{}.yaml", SECRET_NAME)),
        "apiVersion: v1\nkind: Secret\nstringData:\n  api-key: pk1_file\n  secret-key: sk1_file\n",
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/dns/retrieve/example.com"))
        .and(body_partial_json(serde_json::json!({
            "apikey": "pk1_file",
            "secretapikey": "sk1_file"
        })))
        .respond_with(retrieve_response(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let settings = SolverSettings::new(secrets_dir.path()).with_api_base_url(mock_server.uri());
    let mut solver = PorkbunSolver::new();
    solver
        .initialize(SolverContext::from_settings(&settings))
        .await
        .unwrap();

    solver.clean_up(&challenge("token")).await.unwrap();
}
