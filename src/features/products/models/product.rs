use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product lifecycle status matching database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Draft,
    Active,
    Archived,
    PreOrder,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Archived => write!(f, "archived"),
            ProductStatus::PreOrder => write!(f, "pre_order"),
        }
    }
}

/// Database model for product
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub base_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub track_inventory: bool,
    pub allow_backorder: bool,
    pub status: ProductStatus,
    pub is_featured: bool,
    pub is_new_arrival: bool,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    pub depth: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub dimension_unit: String,
    pub weight_unit: String,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Column list matching [`Product`]
pub const PRODUCT_COLUMNS: &str = "id, name, slug, sku, description, short_description, \
     base_price, sale_price, cost_price, stock_quantity, low_stock_threshold, track_inventory, \
     allow_backorder, status, is_featured, is_new_arrival, width, height, depth, weight, \
     dimension_unit, weight_unit, meta_title, meta_description, meta_keywords, created_at, \
     updated_at, published_at";

/// Category linked to a product, keyed by the product for batch loading
#[derive(Debug, Clone, FromRow)]
pub struct ProductCategoryLink {
    pub product_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}
