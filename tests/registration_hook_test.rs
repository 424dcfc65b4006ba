use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};
use signup_gate::config::CandidateComparison;

mod common;

#[tokio::test]
async fn test_allowlisted_email_is_returned() {
    let (app, state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    common::seed_allowlist(&state, "a@example.com").await;
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "a@example.com"}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["email"], "a@example.com");
}

#[tokio::test]
async fn test_unlisted_email_is_forbidden() {
    let (app, state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    common::seed_allowlist(&state, "a@example.com").await;
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "b@example.com"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "forbidden_user_email");
    assert_eq!(body["message"], "Sorry, that email address is not allowed!");
}

#[tokio::test]
async fn test_empty_email_passes_through() {
    let (app, _state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": ""}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["email"], "");

    // a missing field counts as empty
    let response = server.post("/hooks/pre-user-email").json(&json!({})).await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_default_allowlist_rejects_everyone() {
    let (app, _state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    for email in ["a@example.com", "admin@localhost", "anything"] {
        let response = server
            .post("/hooks/pre-user-email")
            .json(&json!({ "email": email }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_exact_comparison_rejects_differently_cased_email() {
    let config = common::create_test_app_config_with_comparison(CandidateComparison::Exact);
    let (app, state) = common::setup_test_app(config).await.unwrap();
    common::seed_allowlist(&state, "A@Example.com").await;
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "A@Example.com"}))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "a@example.com"}))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_canonical_comparison_accepts_differently_cased_email() {
    let config = common::create_test_app_config_with_comparison(CandidateComparison::Canonical);
    let (app, state) = common::setup_test_app(config).await.unwrap();
    common::seed_allowlist(&state, "a@example.com").await;
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "A@Example.com"}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    // the host gets back exactly what it sent
    assert_eq!(body["email"], "A@Example.com");
}

#[tokio::test]
async fn test_custom_rejection_message() {
    let mut config = common::create_test_app_config();
    config.gate.message = "Registration is invite-only.".to_string();
    let (app, _state) = common::setup_test_app(config).await.unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "a@example.com"}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["message"], "Registration is invite-only.");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": 42}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_gate_sees_saves_immediately() {
    let (app, _state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    let server = TestServer::new(app).unwrap();

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "new@example.com"}))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    server
        .put("/admin/allowlist.json")
        .json(&json!({"emails": ["new@example.com"]}))
        .await
        .assert_status(StatusCode::OK);

    let response = server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "new@example.com"}))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_canonical_comparison_rejects_mangled_addresses() {
    let (app, state) = common::setup_test_app(common::create_test_app_config())
        .await
        .unwrap();
    common::seed_allowlist(&state, "ab@example.com,a@example.com").await;
    let server = TestServer::new(app).unwrap();

    for email in [
        "a<b>@example.com",
        "a b@example.com",
        "a(b)@example.com",
        "ab@exa_mple.com",
        "aä@example.com",
        "a@exam ple.com",
        "\"a\"@example.com",
    ] {
        let response = server
            .post("/hooks/pre-user-email")
            .json(&json!({ "email": email }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["code"], "forbidden_user_email", "{} was accepted", email);
    }

    server
        .post("/hooks/pre-user-email")
        .json(&json!({"email": "AB@Example.com"}))
        .await
        .assert_status(StatusCode::OK);
}
