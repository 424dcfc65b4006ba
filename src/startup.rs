use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::allowlist::AllowlistNormalizer;
use crate::auth::{admin_auth_middleware, hook_auth_middleware};
use crate::backend::{AllowlistStore, BackendFactory};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::gate::RegistrationGate;
use crate::logging::logging_middleware;
use crate::resource::{health, hook, settings};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AllowlistStore>,
    pub normalizer: Arc<AllowlistNormalizer>,
    pub gate: Arc<RegistrationGate>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the default normalizer and a gate around the given store
    pub fn new(config: AppConfig, store: Arc<dyn AllowlistStore>) -> Self {
        let normalizer = Arc::new(AllowlistNormalizer::default());
        let gate = RegistrationGate::new(store.clone(), normalizer.clone(), &config.gate);

        Self {
            store,
            normalizer,
            gate: Arc::new(gate),
            config: Arc::new(config),
        }
    }

    /// Build the configured store, then the state around it
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let store = BackendFactory::create(&config.backend).await?;
        Ok(Self::new(config, store))
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let admin_routes = Router::new()
        .route(
            settings::SETTINGS_PATH,
            get(settings::settings_page).post(settings::save_settings_form),
        )
        .route(
            "/admin/allowlist.json",
            get(settings::get_allowlist).put(settings::replace_allowlist),
        )
        .route_layer(middleware::from_fn_with_state(
            config.clone(),
            admin_auth_middleware,
        ));

    let hook_routes = Router::new()
        .route("/hooks/pre-user-email", post(hook::pre_user_email))
        .route_layer(middleware::from_fn_with_state(
            config.clone(),
            hook_auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health::health))
        .merge(admin_routes)
        .merge(hook_routes);

    if config.logging.access_log {
        app = app.layer(middleware::from_fn(logging_middleware));
    }

    app.with_state(state)
}
