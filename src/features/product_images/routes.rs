use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::features::product_images::handlers::{delete_product_image, upload_product_image};
use crate::features::product_images::services::ProductImageService;
use crate::shared::constants::MAX_IMAGE_SIZE;

pub fn routes(service: Arc<ProductImageService>) -> Router {
    Router::new()
        .route(
            "/api/admin/products/upload-image",
            // Leave headroom for multipart framing so the size check can answer with 400
            post(upload_product_image)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024))
                .delete(delete_product_image),
        )
        .with_state(service)
}
