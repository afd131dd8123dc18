//! Lenient deserializers for admin form payloads.
//!
//! Back-office forms post numbers as JSON numbers, numeric strings or empty
//! strings. These helpers normalise them the way the forms expect:
//! leading-number parsing (`"12.50 USD"` -> 12.50), blanks treated as absent.
//!
//! Patch fields use `Option<Option<T>>`: the outer `None` means the field was
//! not sent (leave unchanged), `Some(None)` means clear it. Fields using the
//! `patch_*` helpers must also carry `#[serde(default)]`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

lazy_static! {
    static ref LEADING_DECIMAL: Regex =
        Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
    static ref LEADING_INTEGER: Regex = Regex::new(r"^[+-]?\d+").unwrap();
}

fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    let matched = LEADING_DECIMAL.find(raw.trim_start())?.as_str();

    // Normalise "+5", ".5" and "5." before handing off to rust_decimal
    let (sign, digits) = match matched.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", matched.trim_start_matches('+')),
    };
    let digits = if digits.starts_with('.') {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    let normalised = format!("{}{}", sign, digits.replace(".e", "e").replace(".E", "E"));
    let normalised = normalised.trim_end_matches('.');

    Decimal::from_str(normalised)
        .or_else(|_| Decimal::from_scientific(normalised))
        .ok()
}

fn parse_integer_str(raw: &str) -> Option<i32> {
    LEADING_INTEGER
        .find(raw.trim_start())?
        .as_str()
        .parse::<i32>()
        .ok()
}

/// Interpret a form value as a decimal: numbers and numeric strings parse,
/// anything else (blank, null, garbage, booleans) yields `None`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

/// Interpret a form value as an integer, truncating fractional input.
pub fn integer_from_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|i| i32::try_from(i).ok()),
        Value::String(s) => parse_integer_str(s),
        _ => None,
    }
}

/// Required decimal where blank or unparseable input becomes zero.
/// Pair with `#[serde(default)]` so a missing field is zero too.
pub fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value).unwrap_or(Decimal::ZERO))
}

/// Optional decimal where blank, null or unparseable input becomes `None`.
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

/// Patch field for a nullable decimal column: present blank/null/garbage clears it.
pub fn patch_decimal<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_decimal(deserializer).map(Some)
}

/// Integer where blank, null or unparseable input becomes zero.
pub fn integer_or_zero<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_from_value(&value).unwrap_or(0))
}

/// Patch field for an integer column: any present value is coerced (blank -> 0).
pub fn patch_integer_or_zero<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    integer_or_zero(deserializer).map(Some)
}

/// Optional id where `""` and `null` both mean "none". Malformed ids are rejected.
pub fn optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Patch field for a nullable id: present `""`/`null` clears it.
pub fn patch_uuid<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_uuid(deserializer).map(Some)
}

/// Optional text where a blank string means "none".
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Patch field for nullable text: present blank/null clears it.
pub fn patch_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_text(deserializer).map(Some)
}

/// Patch field for any nullable column without coercion: present `null` clears it.
pub fn patch_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "decimal_or_zero")]
        price: Decimal,
        #[serde(default, deserialize_with = "optional_decimal")]
        sale_price: Option<Decimal>,
        #[serde(default, deserialize_with = "integer_or_zero")]
        display_order: i32,
        #[serde(default, deserialize_with = "optional_uuid")]
        parent_id: Option<Uuid>,
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "patch_decimal")]
        weight: Option<Option<Decimal>>,
        #[serde(default, deserialize_with = "patch_integer_or_zero")]
        display_order: Option<i32>,
        #[serde(default, deserialize_with = "patch_uuid")]
        parent_id: Option<Option<Uuid>>,
        #[serde(default, deserialize_with = "patch_text")]
        description: Option<Option<String>>,
        #[serde(default, deserialize_with = "patch_nullable")]
        keywords: Option<Option<Vec<String>>>,
    }

    fn form(value: Value) -> Form {
        serde_json::from_value(value).unwrap()
    }

    fn patch(value: Value) -> Patch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decimal_or_zero() {
        assert_eq!(form(json!({ "price": 12.5 })).price, dec("12.5"));
        assert_eq!(form(json!({ "price": "499.99" })).price, dec("499.99"));
        assert_eq!(form(json!({ "price": "19.90 USD" })).price, dec("19.90"));
        assert_eq!(form(json!({ "price": ".5" })).price, dec("0.5"));
        assert_eq!(form(json!({ "price": "+3." })).price, dec("3"));
        assert_eq!(form(json!({ "price": "1e3" })).price, dec("1000"));
        assert_eq!(form(json!({ "price": "" })).price, Decimal::ZERO);
        assert_eq!(form(json!({ "price": "abc" })).price, Decimal::ZERO);
        assert_eq!(form(json!({ "price": null })).price, Decimal::ZERO);
        assert_eq!(form(json!({})).price, Decimal::ZERO);
    }

    #[test]
    fn test_optional_decimal() {
        assert_eq!(form(json!({ "sale_price": "10" })).sale_price, Some(dec("10")));
        assert_eq!(form(json!({ "sale_price": "" })).sale_price, None);
        assert_eq!(form(json!({ "sale_price": "n/a" })).sale_price, None);
        assert_eq!(form(json!({ "sale_price": null })).sale_price, None);
        assert_eq!(form(json!({})).sale_price, None);
    }

    #[test]
    fn test_integer_or_zero() {
        assert_eq!(form(json!({ "display_order": 3 })).display_order, 3);
        assert_eq!(form(json!({ "display_order": "7" })).display_order, 7);
        assert_eq!(form(json!({ "display_order": "4th" })).display_order, 4);
        assert_eq!(form(json!({ "display_order": 2.9 })).display_order, 2);
        assert_eq!(form(json!({ "display_order": "" })).display_order, 0);
        assert_eq!(form(json!({ "display_order": "x" })).display_order, 0);
        assert_eq!(form(json!({})).display_order, 0);
    }

    #[test]
    fn test_optional_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(form(json!({ "parent_id": id })).parent_id, Some(id));
        assert_eq!(form(json!({ "parent_id": "" })).parent_id, None);
        assert_eq!(form(json!({ "parent_id": null })).parent_id, None);
        assert!(serde_json::from_value::<Form>(json!({ "parent_id": "nope" })).is_err());
    }

    #[test]
    fn test_patch_fields_distinguish_absent_from_cleared() {
        let absent = patch(json!({}));
        assert_eq!(absent.weight, None);
        assert_eq!(absent.display_order, None);
        assert_eq!(absent.parent_id, None);
        assert_eq!(absent.description, None);
        assert_eq!(absent.keywords, None);

        let cleared = patch(json!({
            "weight": "",
            "display_order": "",
            "parent_id": null,
            "description": "  ",
            "keywords": null
        }));
        assert_eq!(cleared.weight, Some(None));
        assert_eq!(cleared.display_order, Some(0));
        assert_eq!(cleared.parent_id, Some(None));
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.keywords, Some(None));

        let set = patch(json!({ "weight": "12.5", "description": "Solid oak" }));
        assert_eq!(set.weight, Some(Some(dec("12.5"))));
        assert_eq!(set.description, Some(Some("Solid oak".to_string())));
    }
}
