use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dto as auth_dto, handler as auth_handler};
use crate::features::categories::{
    dtos as categories_dtos, handlers as categories_handlers, hierarchy,
};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::product_images::{
    dtos as product_images_dtos, handlers as product_images_handlers,
};
use crate::features::products::{
    dtos as products_dtos, handlers as products_handlers, models as products_models,
};
use crate::features::settings::{dtos as settings_dtos, handlers as settings_handlers};
use crate::shared::types::{ApiResponse, DeletedResponseDto, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handler::get_me,
        // Categories (public)
        categories_handlers::list_categories,
        categories_handlers::get_category,
        // Categories (admin)
        categories_handlers::list_admin_categories,
        categories_handlers::get_admin_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Products (public)
        products_handlers::list_products,
        products_handlers::list_featured_products,
        products_handlers::list_new_arrivals,
        products_handlers::get_product,
        // Products (admin)
        products_handlers::list_admin_products,
        products_handlers::get_admin_product,
        products_handlers::create_product,
        products_handlers::update_product,
        products_handlers::delete_product,
        // Product images (admin)
        product_images_handlers::upload_product_image,
        product_images_handlers::delete_product_image,
        // Settings
        settings_handlers::get_store_settings,
        settings_handlers::get_settings,
        settings_handlers::update_settings,
        // Dashboard (admin)
        dashboard_handlers::get_dashboard,
    ),
    components(
        schemas(
            Meta,
            DeletedResponseDto,
            ApiResponse<DeletedResponseDto>,
            // Auth
            auth_dto::MeResponseDto,
            ApiResponse<auth_dto::MeResponseDto>,
            // Categories
            hierarchy::ParentRef,
            hierarchy::HierarchyDiagnostics,
            hierarchy::DisplayOrder,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryListDto,
            categories_dtos::ParentStatus,
            categories_dtos::CategoryWithLevelDto,
            categories_dtos::AdminCategoryListDto,
            categories_dtos::CategorySummaryDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<categories_dtos::CategoryListDto>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<categories_dtos::AdminCategoryListDto>,
            ApiResponse<categories_dtos::CategoryDetailDto>,
            ApiResponse<categories_dtos::CategoryWithLevelDto>,
            // Products
            products_models::ProductStatus,
            products_dtos::ProductImageDto,
            products_dtos::ProductResponseDto,
            products_dtos::PricingDto,
            products_dtos::StockStatus,
            products_dtos::ReviewDto,
            products_dtos::ProductDetailDto,
            products_dtos::ProductImageInput,
            products_dtos::CreateProductDto,
            products_dtos::UpdateProductDto,
            ApiResponse<Vec<products_dtos::ProductResponseDto>>,
            ApiResponse<products_dtos::ProductResponseDto>,
            ApiResponse<products_dtos::ProductDetailDto>,
            // Product images
            product_images_dtos::UploadProductImageDto,
            product_images_dtos::UploadedImageDto,
            ApiResponse<product_images_dtos::UploadedImageDto>,
            // Settings
            settings_dtos::SettingEntryDto,
            settings_dtos::SettingsResponseDto,
            settings_dtos::StoreSettingsDto,
            settings_dtos::UpdateSettingsDto,
            ApiResponse<settings_dtos::SettingsResponseDto>,
            ApiResponse<settings_dtos::StoreSettingsDto>,
            // Dashboard
            dashboard_dtos::DashboardStatsDto,
            ApiResponse<dashboard_dtos::DashboardStatsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Current user"),
        (name = "categories", description = "Product categories (public)"),
        (name = "products", description = "Product catalog (public)"),
        (name = "settings", description = "Storefront settings (public)"),
        (name = "admin-categories", description = "Category management (admin only)"),
        (name = "admin-products", description = "Product management (admin only)"),
        (name = "admin-settings", description = "Store settings (admin only)"),
        (name = "admin-dashboard", description = "Back-office dashboard (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "Storefront catalog and admin back-office API",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
