use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Headline counts for the back-office home page
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsDto {
    pub total_products: i64,
    pub active_products: i64,
    pub total_categories: i64,
    /// Tracked products at or below their low-stock threshold
    pub low_stock_products: i64,
}
