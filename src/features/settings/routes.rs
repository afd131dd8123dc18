use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::settings::handlers;
use crate::features::settings::services::SettingsService;

/// Public settings routes
pub fn routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route("/api/settings/store", get(handlers::get_store_settings))
        .with_state(service)
}

/// Back-office settings routes (JWT + admin role)
pub fn admin_routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route(
            "/api/admin/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        .with_state(service)
}
