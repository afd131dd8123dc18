use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Back-office dashboard routes (JWT + admin role)
pub fn admin_routes(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/admin/dashboard", get(handlers::get_dashboard))
        .with_state(service)
}
