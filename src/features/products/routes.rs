use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

/// Public catalog routes (no authentication required)
pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/featured", get(handlers::list_featured_products))
        .route("/api/products/new-arrivals", get(handlers::list_new_arrivals))
        .route("/api/products/{slug}", get(handlers::get_product))
        .with_state(service)
}

/// Back-office product routes (JWT + admin role)
pub fn admin_routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route(
            "/api/admin/products",
            get(handlers::list_admin_products).post(handlers::create_product),
        )
        .route(
            "/api/admin/products/{id}",
            get(handlers::get_admin_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .with_state(service)
}
