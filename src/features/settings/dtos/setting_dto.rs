use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::settings::models::Setting;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingEntryDto {
    pub id: Uuid,
    #[schema(value_type = Object)]
    pub value: Value,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// All settings as `{category: {key: entry}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponseDto {
    pub settings: BTreeMap<String, BTreeMap<String, SettingEntryDto>>,
}

impl SettingsResponseDto {
    pub fn group(settings: Vec<Setting>) -> Self {
        let mut grouped: BTreeMap<String, BTreeMap<String, SettingEntryDto>> = BTreeMap::new();
        for s in settings {
            grouped.entry(s.category).or_default().insert(
                s.key,
                SettingEntryDto {
                    id: s.id,
                    value: s.value,
                    description: s.description,
                    updated_at: s.updated_at,
                    updated_by: s.updated_by,
                },
            );
        }
        Self { settings: grouped }
    }
}

/// Storefront settings as `{key: value}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct StoreSettingsDto(pub BTreeMap<String, Value>);

/// Body of `PUT /api/admin/settings`, for Swagger UI.
/// The handler reads the raw JSON so malformed entries can be skipped one by one.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UpdateSettingsDto {
    /// `{key: {value}}`; string values holding JSON are stored parsed
    #[schema(value_type = Object, example = json!({"whatsapp_number": {"value": "+1 555 0100"}, "low_stock_threshold": {"value": "5"}}))]
    pub settings: Value,
}

/// One accepted `{key: {value}}` entry
#[derive(Debug, Clone, PartialEq)]
pub struct SettingUpdate {
    pub key: String,
    pub value: Value,
}

/// Pull the updates out of a settings payload.
///
/// Entries that are not objects or carry no `value` are skipped.
pub fn parse_updates(body: &Value) -> Result<Vec<SettingUpdate>, AppError> {
    let settings = body
        .get("settings")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::BadRequest("Invalid settings data".to_string()))?;

    Ok(settings
        .iter()
        .filter_map(|(key, entry)| {
            let value = entry.as_object()?.get("value")?;
            Some(SettingUpdate {
                key: key.clone(),
                value: decode_value(value),
            })
        })
        .collect())
}

/// Strings holding JSON are decoded (`"5"` -> 5, `"true"` -> true); anything else is kept
pub fn decode_value(value: &Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

/// Display text of a stored value, `None` for blanks and non-scalars
pub fn value_text(value: &Value) -> Option<String> {
    match decode_value(value) {
        Value::String(s) => Some(s).filter(|s| !s.trim().is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setting(category: &str, key: &str, value: Value) -> Setting {
        Setting {
            id: Uuid::new_v4(),
            key: key.to_string(),
            value,
            category: category.to_string(),
            description: None,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    #[test]
    fn test_group_by_category() {
        let grouped = SettingsResponseDto::group(vec![
            setting("general", "currency", json!("USD")),
            setting("store", "store_name", json!("Oak & Co")),
            setting("store", "whatsapp_number", json!("")),
        ]);

        assert_eq!(grouped.settings.len(), 2);
        assert_eq!(grouped.settings["store"].len(), 2);
        assert_eq!(grouped.settings["general"]["currency"].value, json!("USD"));
    }

    #[test]
    fn test_parse_updates_decodes_json_strings() {
        let updates = parse_updates(&json!({
            "settings": {
                "low_stock_threshold": { "value": "7" },
                "tax_enabled": { "value": "true" },
                "store_name": { "value": "Oak & Co" },
                "store_logo": { "value": null },
                "no_value": { "label": "x" },
                "not_an_object": "oops"
            }
        }))
        .unwrap();

        let find = |key: &str| updates.iter().find(|u| u.key == key).map(|u| u.value.clone());
        assert_eq!(updates.len(), 4);
        assert_eq!(find("low_stock_threshold"), Some(json!(7)));
        assert_eq!(find("tax_enabled"), Some(json!(true)));
        assert_eq!(find("store_name"), Some(json!("Oak & Co")));
        assert_eq!(find("store_logo"), Some(Value::Null));
        assert_eq!(find("no_value"), None);
    }

    #[test]
    fn test_parse_updates_requires_settings_object() {
        for body in [json!({}), json!({ "settings": "x" }), json!({ "settings": [1] }), json!(null)] {
            assert!(matches!(parse_updates(&body), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("+1 555 0100")), Some("+1 555 0100".to_string()));
        assert_eq!(value_text(&json!("\"+1 555 0100\"")), Some("+1 555 0100".to_string()));
        assert_eq!(value_text(&json!(15550100)), Some("15550100".to_string()));
        assert_eq!(value_text(&json!("")), None);
        assert_eq!(value_text(&json!(null)), None);
        assert_eq!(value_text(&json!({ "a": 1 })), None);
    }
}
