use sqlx::{FromRow, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::DashboardStatsDto;

#[derive(FromRow)]
struct ProductCounts {
    total: i64,
    active: i64,
    low_stock: i64,
}

/// Service for back-office dashboard queries
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_stats(&self) -> Result<DashboardStatsDto> {
        let products = sqlx::query_as::<_, ProductCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'active') AS active,
                COUNT(*) FILTER (
                    WHERE track_inventory AND stock_quantity <= low_stock_threshold
                ) AS low_stock
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count products: {:?}", e);
            AppError::Database(e)
        })?;

        let total_categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(DashboardStatsDto {
            total_products: products.total,
            active_products: products.active,
            total_categories,
            low_stock_products: products.low_stock,
        })
    }
}
