use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::Value;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::settings::dtos::{
    parse_updates, SettingsResponseDto, StoreSettingsDto, UpdateSettingsDto,
};
use crate::features::settings::services::SettingsService;
use crate::shared::types::{ApiResponse, Meta};

/// List all settings grouped by category
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "Settings grouped by category", body = ApiResponse<SettingsResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin-settings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_settings(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<SettingsService>>,
) -> Result<Json<ApiResponse<SettingsResponseDto>>> {
    let settings = service.list_grouped().await?;
    Ok(Json(ApiResponse::success(Some(settings), None, None)))
}

/// Update setting values
///
/// Unknown keys and failed writes are reported together; the other keys are still saved.
#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = UpdateSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<utoipa::TupleUnit>),
        (status = 400, description = "Invalid settings data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 500, description = "Some settings failed to update")
    ),
    tag = "admin-settings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_settings(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<SettingsService>>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<ApiResponse<()>>> {
    let updates = parse_updates(&body)?;
    let updated = service.update(updates, &user.sub).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Settings updated successfully".to_string()),
        Some(Meta::total(updated as i64)),
    )))
}

/// Public storefront settings (category `store`)
#[utoipa::path(
    get,
    path = "/api/settings/store",
    responses(
        (status = 200, description = "Store settings as key/value map", body = ApiResponse<StoreSettingsDto>)
    ),
    tag = "settings"
)]
pub async fn get_store_settings(
    State(service): State<Arc<SettingsService>>,
) -> Result<Json<ApiResponse<StoreSettingsDto>>> {
    let settings = service.store_settings().await?;
    Ok(Json(ApiResponse::success(
        Some(StoreSettingsDto(settings)),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::settings::routes::admin_routes;
    use crate::features::settings::services::SettingsService;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    fn service() -> Arc<SettingsService> {
        Arc::new(SettingsService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_update_rejects_missing_settings_object() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();

        let response = server
            .put("/api/admin/settings")
            .json(&json!({ "store_name": "Oak & Co" }))
            .await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Invalid settings data");
    }

    #[tokio::test]
    async fn test_customer_cannot_read_settings() {
        let server = TestServer::new(with_customer_auth(admin_routes(service()))).unwrap();

        server
            .get("/api/admin/settings")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_requires_authentication() {
        let server = TestServer::new(admin_routes(service())).unwrap();

        server
            .put("/api/admin/settings")
            .json(&json!({ "settings": {} }))
            .await
            .assert_status_unauthorized();
    }
}
