use crate::core::error::Result;
use crate::features::auth::dto::MeResponseDto;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<Json<ApiResponse<MeResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{with_admin_auth, with_customer_auth};
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_get_me_returns_admin_flag() {
        let app = with_admin_auth(Router::new().route("/api/auth/me", get(get_me)));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/auth/me").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["is_admin"], true);
    }

    #[tokio::test]
    async fn test_get_me_for_customer() {
        let app = with_customer_auth(Router::new().route("/api/auth/me", get(get_me)));
        let server = TestServer::new(app).unwrap();

        let body: serde_json::Value = server.get("/api/auth/me").await.json();
        assert_eq!(body["data"]["is_admin"], false);
        assert_eq!(body["data"]["roles"][0], "customer");
    }

    #[tokio::test]
    async fn test_get_me_without_user_is_unauthorized() {
        let app = Router::new().route("/api/auth/me", get(get_me));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/auth/me").await;
        response.assert_status_unauthorized();
    }
}
