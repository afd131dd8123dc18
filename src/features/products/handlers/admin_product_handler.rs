use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::products::dtos::{
    AdminListProductsQuery, CreateProductDto, ProductResponseDto, UpdateProductDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::{ApiResponse, DeletedResponseDto, Meta};

/// List products in any status
#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(AdminListProductsQuery),
    responses(
        (status = 200, description = "Page of products", body = ApiResponse<Vec<ProductResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_admin_products(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<AdminListProductsQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let (products, total) = service.list_admin(&query).await?;

    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta::paginated(total, &query.pagination())),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with images and categories", body = ApiResponse<ProductResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Product not found")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_admin_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let product = service.get_admin(id).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

/// Create a product with its images and categories
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 409, description = "Slug or SKU already in use")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    AppJson(dto): AppJson<CreateProductDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    dto.check()?;

    let product = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(product),
            Some("Product created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a product
///
/// Omitted fields keep their value. `image_data` and `category_ids`
/// replace the stored rows when sent.
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Slug or SKU already in use")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateProductDto>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    dto.check()?;

    let product = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Product updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<DeletedResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Product not found")
    ),
    tag = "admin-products",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_product(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeletedResponseDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeletedResponseDto { deleted: true }),
        Some("Product deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::products::routes::admin_routes;
    use crate::features::products::services::ProductService;
    use crate::features::settings::SettingsService;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn service() -> Arc<ProductService> {
        let pool = lazy_pool();
        let settings = Arc::new(SettingsService::new(pool.clone()));
        Arc::new(ProductService::new(
            pool,
            settings,
            "http://localhost:3000".to_string(),
        ))
    }

    fn admin_server() -> TestServer {
        TestServer::new(with_admin_auth(admin_routes(service()))).unwrap()
    }

    #[tokio::test]
    async fn test_customer_is_forbidden() {
        let server = TestServer::new(with_customer_auth(admin_routes(service()))).unwrap();

        server
            .get("/api/admin/products")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_requires_positive_base_price() {
        let response = admin_server()
            .post("/api/admin/products")
            .json(&json!({ "name": "Teak Bench", "base_price": "" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(
            body["message"],
            "Base price is required and must be greater than 0"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_image_without_url() {
        let response = admin_server()
            .post("/api/admin/products")
            .json(&json!({
                "name": "Teak Bench",
                "base_price": 120,
                "image_data": [{ "url": " ", "is_primary": true }]
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Image url is required");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_slug() {
        admin_server()
            .post("/api/admin/products")
            .json(&json!({ "name": "Teak Bench", "slug": "Teak Bench", "base_price": 120 }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_update_rejects_zero_base_price() {
        admin_server()
            .put(&format!("/api/admin/products/{}", Uuid::new_v4()))
            .json(&json!({ "base_price": 0 }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_status() {
        admin_server()
            .put(&format!("/api/admin/products/{}", Uuid::new_v4()))
            .json(&json!({ "status": "discontinued" }))
            .await
            .assert_status_bad_request();
    }
}
