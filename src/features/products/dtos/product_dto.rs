use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::categories::dtos::CategorySummaryDto;
use crate::features::products::models::{Product, ProductImage, ProductStatus, Review};
use crate::shared::coerce;
use crate::shared::constants::{DEFAULT_HIGHLIGHT_LIMIT, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::PaginationQuery;

const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImageDto {
    pub id: Uuid,
    pub url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_primary: bool,
}

impl From<ProductImage> for ProductImageDto {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id,
            url: image.url,
            alt_text: image.alt_text,
            display_order: image.display_order,
            is_primary: image.is_primary,
        }
    }
}

/// Product with its images and categories
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    #[schema(value_type = String, example = "499.00")]
    pub base_price: Decimal,
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Decimal>,
    /// Only present in back-office responses
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub track_inventory: bool,
    pub allow_backorder: bool,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub is_new_arrival: bool,
    #[schema(value_type = Option<String>)]
    pub width: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub height: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub depth: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub weight: Option<Decimal>,
    pub dimension_unit: String,
    pub weight_unit: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub images: Vec<ProductImageDto>,
    pub categories: Vec<CategorySummaryDto>,
}

impl ProductResponseDto {
    pub fn new(
        p: Product,
        images: Vec<ProductImageDto>,
        categories: Vec<CategorySummaryDto>,
    ) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            sku: p.sku,
            description: p.description,
            short_description: p.short_description,
            base_price: p.base_price,
            sale_price: p.sale_price,
            cost_price: p.cost_price,
            stock_quantity: p.stock_quantity,
            low_stock_threshold: p.low_stock_threshold,
            track_inventory: p.track_inventory,
            allow_backorder: p.allow_backorder,
            status: p.status,
            is_featured: p.is_featured,
            is_new_arrival: p.is_new_arrival,
            width: p.width,
            height: p.height,
            depth: p.depth,
            weight: p.weight,
            dimension_unit: p.dimension_unit,
            weight_unit: p.weight_unit,
            meta_title: p.meta_title,
            meta_description: p.meta_description,
            meta_keywords: p.meta_keywords,
            created_at: p.created_at,
            updated_at: p.updated_at,
            published_at: p.published_at,
            images,
            categories,
        }
    }

    /// Drop fields the storefront must not see
    pub fn for_storefront(mut self) -> Self {
        self.cost_price = None;
        self
    }

    /// First image flagged primary, else the first image
    pub fn primary_image(&self) -> Option<&ProductImageDto> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
    }
}

/// Price shown to the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingDto {
    #[schema(value_type = String)]
    pub display_price: Decimal,
    #[schema(value_type = String)]
    pub base_price: Decimal,
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Decimal>,
    pub has_discount: bool,
    /// `base_price - sale_price` when discounted, else 0
    #[schema(value_type = String)]
    pub savings: Decimal,
}

impl PricingDto {
    pub fn new(base_price: Decimal, sale_price: Option<Decimal>) -> Self {
        let discounted = sale_price.filter(|sale| *sale > Decimal::ZERO && *sale < base_price);

        match discounted {
            Some(sale) => Self {
                display_price: sale,
                base_price,
                sale_price,
                has_discount: true,
                savings: base_price - sale,
            },
            None => Self {
                display_price: base_price,
                base_price,
                sale_price,
                has_discount: false,
                savings: Decimal::ZERO,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    PreOrder,
    OutOfStock,
}

impl StockStatus {
    pub fn of(stock_quantity: i32, status: ProductStatus) -> Self {
        if stock_quantity > 0 {
            StockStatus::InStock
        } else if status == ProductStatus::PreOrder {
            StockStatus::PreOrder
        } else {
            StockStatus::OutOfStock
        }
    }

    pub fn can_purchase(self) -> bool {
        self != StockStatus::OutOfStock
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewDto {
    pub id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewDto {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            rating: r.rating,
            title: r.title,
            comment: r.comment,
            is_verified_purchase: r.is_verified_purchase,
            created_at: r.created_at,
        }
    }
}

/// Mean rating, 0 when there are no reviews
pub fn average_rating(reviews: &[ReviewDto]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    sum as f64 / reviews.len() as f64
}

/// Everything the storefront product page renders
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetailDto {
    #[serde(flatten)]
    pub product: ProductResponseDto,
    pub pricing: PricingDto,
    pub primary_image: Option<ProductImageDto>,
    pub stock_status: StockStatus,
    pub can_purchase: bool,
    pub reviews: Vec<ReviewDto>,
    pub review_count: usize,
    pub average_rating: f64,
    pub related_products: Vec<ProductResponseDto>,
    /// Messaging deep link for product inquiries, when the store has a number configured
    pub whatsapp_url: Option<String>,
}

impl ProductDetailDto {
    pub fn new(
        product: ProductResponseDto,
        reviews: Vec<ReviewDto>,
        related_products: Vec<ProductResponseDto>,
        whatsapp_url: Option<String>,
    ) -> Self {
        let product = product.for_storefront();
        let pricing = PricingDto::new(product.base_price, product.sale_price);
        let primary_image = product.primary_image().cloned();
        let stock_status = StockStatus::of(product.stock_quantity, product.status);

        Self {
            pricing,
            primary_image,
            stock_status,
            can_purchase: stock_status.can_purchase(),
            review_count: reviews.len(),
            average_rating: average_rating(&reviews),
            reviews,
            related_products,
            whatsapp_url,
            product,
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Storefront catalog filters
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListProductsQuery {
    /// Category slug
    pub category: Option<String>,
    /// Matches name or description
    pub search: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub new_arrival: bool,
    /// `active` (default) or `pre_order`
    pub status: Option<ProductStatus>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl ListProductsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Status filter; the storefront never lists drafts or archived products
    pub fn storefront_status(&self) -> Result<ProductStatus, AppError> {
        match self.status.unwrap_or(ProductStatus::Active) {
            status @ (ProductStatus::Active | ProductStatus::PreOrder) => Ok(status),
            other => Err(AppError::BadRequest(format!(
                "Products with status '{}' are not listed",
                other
            ))),
        }
    }
}

/// Size of the featured / new-arrival strips
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HighlightQuery {
    /// Default 8
    pub limit: Option<i64>,
}

impl HighlightQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HIGHLIGHT_LIMIT)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Back-office product list filters
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AdminListProductsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<ProductStatus>,
    /// Matches name or SKU
    pub search: Option<String>,
}

impl AdminListProductsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Image row submitted with a product form
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProductImageInput {
    pub url: String,
    /// Defaults to the product name
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub alt_text: Option<String>,
    #[serde(default, deserialize_with = "coerce::integer_or_zero")]
    pub display_order: i32,
    #[serde(default)]
    pub is_primary: bool,
}

/// Reject image rows without a URL
pub fn check_images(images: &[ProductImageInput]) -> Result<(), AppError> {
    if images.iter().any(|img| img.url.trim().is_empty()) {
        return Err(AppError::Validation("Image url is required".to_string()));
    }
    Ok(())
}

fn check_base_price(base_price: Decimal) -> Result<(), AppError> {
    if base_price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Base price is required and must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn default_true() -> bool {
    true
}

fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

/// Request DTO for creating a product
///
/// Numbers may be posted as JSON numbers or numeric strings.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Defaults to the slugified name
    #[validate(regex(
        path = "*crate::shared::validation::SLUG_REGEX",
        message = "Slug must be lowercase alphanumeric words separated by single hyphens"
    ))]
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub slug: Option<String>,

    /// Generated from the name when omitted
    #[validate(length(max = 100, message = "SKU must be at most 100 characters"))]
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub short_description: Option<String>,

    /// Blank or unparseable input counts as 0 and is rejected
    #[serde(default, deserialize_with = "coerce::decimal_or_zero")]
    #[schema(value_type = String, example = "499.00")]
    pub base_price: Decimal,

    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Decimal>,

    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub cost_price: Option<Decimal>,

    #[serde(default, deserialize_with = "coerce::integer_or_zero")]
    pub stock_quantity: i32,

    #[serde(
        default = "default_low_stock_threshold",
        deserialize_with = "coerce::integer_or_zero"
    )]
    pub low_stock_threshold: i32,

    #[serde(default = "default_true")]
    pub track_inventory: bool,

    #[serde(default)]
    pub allow_backorder: bool,

    #[serde(default)]
    pub status: ProductStatus,

    #[serde(default)]
    pub is_featured: bool,

    #[serde(default)]
    pub is_new_arrival: bool,

    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub width: Option<Decimal>,

    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub height: Option<Decimal>,

    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub depth: Option<Decimal>,

    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub weight: Option<Decimal>,

    /// Defaults to "in"
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub dimension_unit: Option<String>,

    /// Defaults to "lb"
    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub weight_unit: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub meta_title: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub meta_description: Option<String>,

    pub meta_keywords: Option<Vec<String>>,

    #[serde(default)]
    pub image_data: Vec<ProductImageInput>,

    #[serde(default)]
    pub category_ids: Vec<Uuid>,
}

impl CreateProductDto {
    /// Checks that need the coerced values
    pub fn check(&self) -> Result<(), AppError> {
        check_base_price(self.base_price)?;
        check_images(&self.image_data)
    }
}

/// Request DTO for updating a product; omitted fields are left unchanged.
///
/// `image_data` and `category_ids`, when present, replace the stored rows.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(regex(
        path = "*crate::shared::validation::SLUG_REGEX",
        message = "Slug must be lowercase alphanumeric words separated by single hyphens"
    ))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 100, message = "SKU must be 1-100 characters"))]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub short_description: Option<Option<String>>,

    /// Blank or unparseable input leaves the price unchanged
    #[serde(default, deserialize_with = "coerce::optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub base_price: Option<Decimal>,

    #[serde(default, deserialize_with = "coerce::patch_decimal")]
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "coerce::patch_decimal")]
    #[schema(value_type = Option<String>)]
    pub cost_price: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "coerce::patch_integer_or_zero")]
    pub stock_quantity: Option<i32>,

    #[serde(default, deserialize_with = "coerce::patch_integer_or_zero")]
    pub low_stock_threshold: Option<i32>,

    pub track_inventory: Option<bool>,

    pub allow_backorder: Option<bool>,

    pub status: Option<ProductStatus>,

    pub is_featured: Option<bool>,

    pub is_new_arrival: Option<bool>,

    #[serde(default, deserialize_with = "coerce::patch_decimal")]
    #[schema(value_type = Option<String>)]
    pub width: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "coerce::patch_decimal")]
    #[schema(value_type = Option<String>)]
    pub height: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "coerce::patch_decimal")]
    #[schema(value_type = Option<String>)]
    pub depth: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "coerce::patch_decimal")]
    #[schema(value_type = Option<String>)]
    pub weight: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub dimension_unit: Option<String>,

    #[serde(default, deserialize_with = "coerce::optional_text")]
    pub weight_unit: Option<String>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub meta_title: Option<Option<String>>,

    #[serde(default, deserialize_with = "coerce::patch_text")]
    #[schema(value_type = Option<String>)]
    pub meta_description: Option<Option<String>>,

    #[serde(default, deserialize_with = "coerce::patch_nullable")]
    #[schema(value_type = Option<Vec<String>>)]
    pub meta_keywords: Option<Option<Vec<String>>>,

    pub image_data: Option<Vec<ProductImageInput>>,

    pub category_ids: Option<Vec<Uuid>>,
}

impl UpdateProductDto {
    /// Checks that need the coerced values
    pub fn check(&self) -> Result<(), AppError> {
        if let Some(base_price) = self.base_price {
            check_base_price(base_price)?;
        }
        match &self.image_data {
            Some(images) => check_images(images),
            None => Ok(()),
        }
    }

    /// Apply the provided scalar fields on top of the stored product.
    /// Images and categories are handled by the caller.
    pub fn apply(self, mut product: Product) -> Product {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(slug) = self.slug {
            product.slug = slug;
        }
        if let Some(sku) = self.sku {
            product.sku = sku;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(short_description) = self.short_description {
            product.short_description = short_description;
        }
        if let Some(base_price) = self.base_price {
            product.base_price = base_price;
        }
        if let Some(sale_price) = self.sale_price {
            product.sale_price = sale_price;
        }
        if let Some(cost_price) = self.cost_price {
            product.cost_price = cost_price;
        }
        if let Some(stock_quantity) = self.stock_quantity {
            product.stock_quantity = stock_quantity;
        }
        if let Some(low_stock_threshold) = self.low_stock_threshold {
            product.low_stock_threshold = low_stock_threshold;
        }
        if let Some(track_inventory) = self.track_inventory {
            product.track_inventory = track_inventory;
        }
        if let Some(allow_backorder) = self.allow_backorder {
            product.allow_backorder = allow_backorder;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(is_featured) = self.is_featured {
            product.is_featured = is_featured;
        }
        if let Some(is_new_arrival) = self.is_new_arrival {
            product.is_new_arrival = is_new_arrival;
        }
        if let Some(width) = self.width {
            product.width = width;
        }
        if let Some(height) = self.height {
            product.height = height;
        }
        if let Some(depth) = self.depth {
            product.depth = depth;
        }
        if let Some(weight) = self.weight {
            product.weight = weight;
        }
        if let Some(dimension_unit) = self.dimension_unit {
            product.dimension_unit = dimension_unit;
        }
        if let Some(weight_unit) = self.weight_unit {
            product.weight_unit = weight_unit;
        }
        if let Some(meta_title) = self.meta_title {
            product.meta_title = meta_title;
        }
        if let Some(meta_description) = self.meta_description {
            product.meta_description = meta_description;
        }
        if let Some(meta_keywords) = self.meta_keywords {
            product.meta_keywords = meta_keywords;
        }
        product
    }
}
