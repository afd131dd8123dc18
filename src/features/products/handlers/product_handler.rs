use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::products::dtos::{
    HighlightQuery, ListProductsQuery, ProductDetailDto, ProductResponseDto,
};
use crate::features::products::services::ProductService;
use crate::shared::types::{ApiResponse, Meta};

/// Browse the catalog
///
/// Only `active` and `pre_order` products are listed. Newest first.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Page of products", body = ApiResponse<Vec<ProductResponseDto>>),
        (status = 400, description = "Invalid filter")
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<ListProductsQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let (products, total) = service.list(&query).await?;

    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta::paginated(total, &query.pagination())),
    )))
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    params(HighlightQuery),
    responses(
        (status = 200, description = "Featured active products", body = ApiResponse<Vec<ProductResponseDto>>)
    ),
    tag = "products"
)]
pub async fn list_featured_products(
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<HighlightQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let products = service.featured(query.limit()).await?;
    let total = products.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/products/new-arrivals",
    params(HighlightQuery),
    responses(
        (status = 200, description = "New-arrival active products", body = ApiResponse<Vec<ProductResponseDto>>)
    ),
    tag = "products"
)]
pub async fn list_new_arrivals(
    State(service): State<Arc<ProductService>>,
    AppQuery(query): AppQuery<HighlightQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let products = service.new_arrivals(query.limit()).await?;
    let total = products.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(products),
        None,
        Some(Meta::total(total)),
    )))
}

/// Product page by slug
///
/// Includes pricing, stock status, approved reviews, related products and
/// the WhatsApp inquiry link when a store number is configured.
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductDetailDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDetailDto>>> {
    let product = service.get_detail_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(product), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::products::routes::routes;
    use crate::features::products::services::ProductService;
    use crate::features::settings::SettingsService;
    use crate::shared::test_helpers::lazy_pool;
    use axum_test::TestServer;
    use std::sync::Arc;

    fn service() -> Arc<ProductService> {
        let pool = lazy_pool();
        let settings = Arc::new(SettingsService::new(pool.clone()));
        Arc::new(ProductService::new(
            pool,
            settings,
            "http://localhost:3000".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_list_rejects_draft_status() {
        let server = TestServer::new(routes(service())).unwrap();

        let response = server.get("/api/products?status=draft").await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Products with status 'draft' are not listed");
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let server = TestServer::new(routes(service())).unwrap();

        server
            .get("/api/products?status=sold_out")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_highlight_limit_must_be_numeric() {
        let server = TestServer::new(routes(service())).unwrap();

        server
            .get("/api/products/featured?limit=many")
            .await
            .assert_status_bad_request();
    }
}
