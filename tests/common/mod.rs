use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use signup_gate::config::{AppConfig, AuthConfig, CandidateComparison};
use signup_gate::startup::{build_router, AppState};

/// Create a test app backed by an in-memory SQLite store
pub async fn setup_test_app(
    app_config: AppConfig,
) -> Result<(Router, AppState), Box<dyn std::error::Error>> {
    let state = AppState::from_config(app_config).await?;
    let app = build_router(state.clone());
    Ok((app, state))
}

/// Zero-config setup: in-memory SQLite, no authentication
pub fn create_test_app_config() -> AppConfig {
    let mut config = AppConfig::default_config();
    config.logging.access_log = false;
    config
}

#[allow(dead_code)]
pub fn create_test_app_config_with_comparison(comparison: CandidateComparison) -> AppConfig {
    let mut config = create_test_app_config();
    config.gate.comparison = comparison;
    config
}

#[allow(dead_code)]
pub fn create_secured_app_config() -> AppConfig {
    let mut config = create_test_app_config();
    config.admin.auth = AuthConfig::basic("admin", "admin-password");
    config.hook.auth = AuthConfig::bearer("hook-token-123");
    config
}

#[allow(dead_code)]
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{}:{}", username, password))
    )
}

/// Normalize and store an allow-list without going through HTTP
#[allow(dead_code)]
pub async fn seed_allowlist(state: &AppState, raw: &str) {
    let allowlist = state.normalizer.normalize(raw);
    state.store.set(&allowlist).await.unwrap();
}
