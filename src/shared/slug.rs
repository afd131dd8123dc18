use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::validation::SLUG_REGEX;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^a-z0-9_\-]+").unwrap();
    static ref REPEATED_HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
    static ref NON_SKU_CHARS: Regex = Regex::new(r"[^A-Z0-9]+").unwrap();
}

const SKU_BASE_LEN: usize = 8;
const SKU_VARIANT_LEN: usize = 4;
const SKU_SUFFIX_LEN: u32 = 4;

/// Turn a display name into a URL slug.
///
/// "  Single Sink Vanities! " -> "single-sink-vanities"
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let hyphenated = WHITESPACE.replace_all(lowered.trim(), "-");
    let cleaned = NON_WORD.replace_all(&hyphenated, "");
    let collapsed = REPEATED_HYPHENS.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

/// Explicit slug, or one derived from the name
pub fn resolve_slug(slug: Option<String>, name: &str) -> Result<String, AppError> {
    let slug = slug.unwrap_or_else(|| slugify(name));
    if !SLUG_REGEX.is_match(&slug) {
        return Err(AppError::Validation(format!(
            "Cannot derive a valid slug from '{}'; please provide one",
            name
        )));
    }
    Ok(slug)
}

/// Build a stock keeping unit such as `OAKVANIT-WHIT-7K2Q`.
///
/// The base is the first 8 alphanumeric characters of the name, the optional
/// variant contributes 4 more, and a random base-36 suffix keeps SKUs of
/// same-named products apart.
pub fn generate_sku(name: &str, variant: Option<&str>) -> String {
    let base = sku_part(name, SKU_BASE_LEN);
    let variant = variant
        .map(|v| sku_part(v, SKU_VARIANT_LEN))
        .filter(|v| !v.is_empty());

    match variant {
        Some(variant) => format!("{}-{}-{}", base, variant, random_base36(SKU_SUFFIX_LEN)),
        None => format!("{}-{}", base, random_base36(SKU_SUFFIX_LEN)),
    }
}

fn sku_part(text: &str, max_len: usize) -> String {
    NON_SKU_CHARS
        .replace_all(&text.to_uppercase(), "")
        .chars()
        .take(max_len)
        .collect()
}

/// Random uppercase base-36 token of `len` characters (at most 24)
pub fn random_base36(len: u32) -> String {
    let len = len.min(24);
    let mut n = Uuid::new_v4().as_u128() % 36u128.pow(len);
    let mut token = Vec::with_capacity(len as usize);
    for _ in 0..len {
        let digit = (n % 36) as u32;
        n /= 36;
        token.push(
            char::from_digit(digit, 36)
                .unwrap_or('0')
                .to_ascii_uppercase(),
        );
    }
    token.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Bathroom Vanities"), "bathroom-vanities");
        assert_eq!(slugify("  Single   Sink  "), "single-sink");
        assert_eq!(slugify("Oak & Walnut"), "oak-walnut");
        assert_eq!(slugify("--Mirrors--"), "mirrors");
        assert_eq!(slugify("36\" Vanity_Set"), "36-vanity_set");
    }

    #[test]
    fn test_slugify_drops_non_ascii_and_may_be_empty() {
        assert_eq!(slugify("Café Crème"), "caf-crme");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_output_is_valid_slug() {
        for name in ["Bathroom Vanities", "A  --  B", "x_y z", "  Mirrors 2024 "] {
            let slug = slugify(name);
            assert!(SLUG_REGEX.is_match(&slug), "{slug:?} from {name:?}");
        }
    }

    #[test]
    fn test_generate_sku_shape() {
        let sku = generate_sku("Oak Vanity 36\"", None);
        let parts: Vec<&str> = sku.split('-').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "OAKVANIT");
        assert_eq!(parts[1].len(), 4);
        assert!(parts[1]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_sku_with_variant() {
        let sku = generate_sku("Mirror", Some("white gloss"));
        let parts: Vec<&str> = sku.split('-').collect();
        assert_eq!(parts[0], "MIRROR");
        assert_eq!(parts[1], "WHIT");
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_generate_sku_blank_variant_is_ignored() {
        let sku = generate_sku("Mirror", Some("  "));
        assert_eq!(sku.split('-').count(), 2);
    }

    #[test]
    fn test_resolve_slug_defaults_to_name() {
        assert_eq!(
            resolve_slug(None, "Bathroom Vanities").unwrap(),
            "bathroom-vanities"
        );
        assert_eq!(
            resolve_slug(Some("custom".to_string()), "Whatever").unwrap(),
            "custom"
        );
    }

    #[test]
    fn test_resolve_slug_rejects_unsluggable_name() {
        assert!(matches!(
            resolve_slug(None, "!!!"),
            Err(AppError::Validation(_))
        ));
    }
}
