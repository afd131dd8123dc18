use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::auth::guards::RequireAdmin;
use crate::features::product_images::dtos::{
    is_allowed_image_type, is_product_image_path, DeleteImageQuery, UploadProductImageDto,
    UploadedImageDto,
};
use crate::features::product_images::services::ProductImageService;
use crate::shared::constants::MAX_IMAGE_SIZE;
use crate::shared::types::{ApiResponse, DeletedResponseDto};

/// Upload a product image
///
/// Accepts multipart/form-data with a single `file` field.
#[utoipa::path(
    post,
    path = "/api/admin/products/upload-image",
    tag = "admin-products",
    request_body(
        content = UploadProductImageDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<UploadedImageDto>),
        (status = 400, description = "Missing file, wrong type or too large"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_product_image(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ProductImageService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadedImageDto>>)> {
    let mut file: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        file = Some((data.to_vec(), content_type));
    }

    let (data, content_type) = file
        .filter(|(data, _)| !data.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    if !is_allowed_image_type(&content_type) {
        return Err(AppError::BadRequest(
            "Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed.".to_string(),
        ));
    }

    if data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(
            "File size exceeds 5MB limit".to_string(),
        ));
    }

    debug!("{} uploading {} bytes of {}", user.sub, data.len(), content_type);
    let uploaded = service.upload(data, &content_type).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(uploaded), None, None)),
    ))
}

/// Delete a previously uploaded product image
#[utoipa::path(
    delete,
    path = "/api/admin/products/upload-image",
    tag = "admin-products",
    params(DeleteImageQuery),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse<DeletedResponseDto>),
        (status = 400, description = "Missing or invalid path"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_product_image(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProductImageService>>,
    AppQuery(query): AppQuery<DeleteImageQuery>,
) -> Result<Json<ApiResponse<DeletedResponseDto>>> {
    let path = query
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No file path provided".to_string()))?;

    if !is_product_image_path(&path) {
        return Err(AppError::BadRequest("Invalid file path".to_string()));
    }

    service.delete(&path).await?;

    Ok(Json(ApiResponse::success(
        Some(DeletedResponseDto { deleted: true }),
        Some("Image deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use crate::core::config::StorageConfig;
    use crate::features::product_images::routes;
    use crate::features::product_images::services::ProductImageService;
    use crate::modules::storage::StorageClient;
    use crate::shared::test_helpers::{with_admin_auth, with_customer_auth};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use std::sync::Arc;

    fn service() -> Arc<ProductImageService> {
        let storage = StorageClient::new(StorageConfig {
            endpoint: "http://localhost:1".to_string(),
            public_endpoint: "http://localhost:1".to_string(),
            access_key: "test".to_string(),
            secret_key: "test".to_string(),
            bucket: "product-images".to_string(),
            region: "us-east-1".to_string(),
            public_prefix: "public".to_string(),
        })
        .unwrap();
        Arc::new(ProductImageService::new(Arc::new(storage)))
    }

    fn admin_server() -> TestServer {
        TestServer::new(with_admin_auth(routes::routes(service()))).unwrap()
    }

    fn message(response: axum_test::TestResponse) -> String {
        let body: serde_json::Value = response.json();
        body["message"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let form = MultipartForm::new().add_text("note", "no file here");

        let response = admin_server()
            .post("/api/admin/products/upload-image")
            .multipart(form)
            .await;
        response.assert_status_bad_request();
        assert_eq!(message(response), "No file provided");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image() {
        let part = Part::bytes(b"%PDF-1.4".to_vec())
            .file_name("spec.pdf")
            .mime_type("application/pdf");
        let form = MultipartForm::new().add_part("file", part);

        let response = admin_server()
            .post("/api/admin/products/upload-image")
            .multipart(form)
            .await;
        response.assert_status_bad_request();
        assert_eq!(
            message(response),
            "Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed."
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_image() {
        let part = Part::bytes(vec![0u8; 5 * 1024 * 1024 + 1])
            .file_name("huge.png")
            .mime_type("image/png");
        let form = MultipartForm::new().add_part("file", part);

        let response = admin_server()
            .post("/api/admin/products/upload-image")
            .multipart(form)
            .await;
        response.assert_status_bad_request();
        assert_eq!(message(response), "File size exceeds 5MB limit");
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let server = TestServer::new(with_customer_auth(routes::routes(service()))).unwrap();
        let part = Part::bytes(vec![1, 2, 3]).file_name("a.png").mime_type("image/png");

        let response = server
            .post("/api/admin/products/upload-image")
            .multipart(MultipartForm::new().add_part("file", part))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_requires_path() {
        let response = admin_server()
            .delete("/api/admin/products/upload-image")
            .await;
        response.assert_status_bad_request();
        assert_eq!(message(response), "No file path provided");
    }

    #[tokio::test]
    async fn test_delete_rejects_path_outside_product_folder() {
        let response = admin_server()
            .delete("/api/admin/products/upload-image")
            .add_query_param("path", "products/../config.json")
            .await;
        response.assert_status_bad_request();
        assert_eq!(message(response), "Invalid file path");
    }
}
