use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::settings::dtos::{decode_value, value_text, SettingUpdate, SettingsResponseDto};
use crate::features::settings::models::Setting;
use crate::shared::constants::STORE_SETTINGS_CATEGORY;

/// Service for store settings
pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every setting grouped by category
    pub async fn list_grouped(&self) -> Result<SettingsResponseDto> {
        let settings = sqlx::query_as::<_, Setting>(
            r#"
            SELECT id, key, value, category, description, updated_at, updated_by
            FROM settings
            ORDER BY category, key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list settings: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(SettingsResponseDto::group(settings))
    }

    /// Write each value independently; failures are collected, not short-circuited
    pub async fn update(&self, updates: Vec<SettingUpdate>, updated_by: &str) -> Result<usize> {
        let mut failures = Vec::new();
        let total = updates.len();

        for update in updates {
            let result = sqlx::query(
                r#"
                UPDATE settings
                SET value = $2, updated_by = $3, updated_at = NOW()
                WHERE key = $1
                "#,
            )
            .bind(&update.key)
            .bind(&update.value)
            .bind(updated_by)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    failures.push(format!("{}: unknown setting", update.key));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Failed to update setting {}: {:?}", update.key, e);
                    failures.push(format!("{}: {}", update.key, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(AppError::PartialFailure {
                message: "Some settings failed to update".to_string(),
                failures,
            });
        }

        tracing::info!("{} updated {} settings", updated_by, total);
        Ok(total)
    }

    /// Public storefront settings as `{key: value}`
    pub async fn store_settings(&self) -> Result<BTreeMap<String, Value>> {
        let rows: Vec<(String, Value)> = sqlx::query_as(
            "SELECT key, value FROM settings WHERE category = $1 ORDER BY key",
        )
        .bind(STORE_SETTINGS_CATEGORY)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load store settings: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(key, value)| (key, decode_value(&value)))
            .collect())
    }

    /// Text of a single store setting; blank values read as `None`
    pub async fn store_text(&self, key: &str) -> Result<Option<String>> {
        let value: Option<Value> = sqlx::query_scalar(
            "SELECT value FROM settings WHERE category = $1 AND key = $2",
        )
        .bind(STORE_SETTINGS_CATEGORY)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(value.as_ref().and_then(value_text))
    }
}
