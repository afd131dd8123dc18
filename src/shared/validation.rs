use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs (categories, products)
    /// Lowercase alphanumeric (underscores allowed) separated by single hyphens
    /// - Valid: "bathroom-vanities", "vanity_36", "a"
    /// - Invalid: "-vanity", "vanity-", "single--vanity", "Vanity", "vanity sink"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9_]+(?:-[a-z0-9_]+)*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("bathroom-vanities"));
        assert!(SLUG_REGEX.is_match("vanity_36"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-vanity")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("vanity-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("single--vanity")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Vanity")); // uppercase
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("vanity sink")); // space
    }
}
