use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::dashboard::dtos::DashboardStatsDto;
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::ApiResponse;

/// Catalog counts for the back-office home page
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard counts", body = ApiResponse<DashboardStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin-dashboard",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_dashboard(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardStatsDto>>> {
    let stats = service.get_stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::dashboard::routes::admin_routes;
    use crate::features::dashboard::services::DashboardService;
    use crate::shared::test_helpers::{lazy_pool, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    fn service() -> Arc<DashboardService> {
        Arc::new(DashboardService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_customer_is_forbidden() {
        let server = TestServer::new(with_customer_auth(admin_routes(service()))).unwrap();

        server
            .get("/api/admin/dashboard")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let server = TestServer::new(admin_routes(service())).unwrap();

        server
            .get("/api/admin/dashboard")
            .await
            .assert_status_unauthorized();
    }
}
