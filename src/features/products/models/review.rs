use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Approved customer review shown on the product page
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}
