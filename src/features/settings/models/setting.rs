use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Key/value store setting (value is JSONB)
#[derive(Debug, Clone, FromRow)]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    pub value: Value,
    pub category: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Subject of the admin who last changed the value
    pub updated_by: Option<String>,
}
