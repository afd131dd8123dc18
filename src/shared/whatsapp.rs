//! `wa.me` click-to-chat links for product inquiries.

const WA_ME_BASE: &str = "https://wa.me";

/// Build a click-to-chat link for `phone`.
///
/// Everything except digits and `+` is stripped from the number. The
/// message is percent-encoded and only attached when non-empty. Returns
/// `None` when the number has no digits left.
pub fn whatsapp_url(phone: &str, message: Option<&str>) -> Option<String> {
    let formatted: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if !formatted.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let url = match message.filter(|m| !m.is_empty()) {
        Some(text) => format!(
            "{}/{}?text={}",
            WA_ME_BASE,
            formatted,
            encode_component(text)
        ),
        None => format!("{}/{}", WA_ME_BASE, formatted),
    };

    Some(url)
}

/// Percent-encode like `encodeURIComponent`: `! ' ( ) *` stay literal
fn encode_component(text: &str) -> String {
    let mut encoded = urlencoding::encode(text).into_owned();
    for (escaped, literal) in [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ] {
        encoded = encoded.replace(escaped, literal);
    }
    encoded
}

/// Inquiry message prefilled on the product detail page
pub fn product_inquiry_message(product_name: &str, frontend_url: &str, slug: &str) -> String {
    format!(
        "Hi, I'm interested in {} ({}/products/{})",
        product_name, frontend_url, slug
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting_from_number() {
        assert_eq!(
            whatsapp_url("+1 (555) 010-2030", None).as_deref(),
            Some("https://wa.me/+15550102030")
        );
    }

    #[test]
    fn test_empty_message_is_omitted() {
        assert_eq!(
            whatsapp_url("15550102030", Some("")).as_deref(),
            Some("https://wa.me/15550102030")
        );
    }

    #[test]
    fn test_message_is_percent_encoded() {
        let url = whatsapp_url("15550102030", Some("Hi & hello?")).unwrap();
        assert_eq!(url, "https://wa.me/15550102030?text=Hi%20%26%20hello%3F");
    }

    #[test]
    fn test_message_keeps_uri_component_marks() {
        let url = whatsapp_url("15550102030", Some("Hi, I'm in (2x)! *")).unwrap();
        assert_eq!(
            url,
            "https://wa.me/15550102030?text=Hi%2C%20I'm%20in%20(2x)!%20*"
        );
    }

    #[test]
    fn test_number_without_digits() {
        assert_eq!(whatsapp_url("call us", Some("hi")), None);
        assert_eq!(whatsapp_url("+", None), None);
        assert_eq!(whatsapp_url("", None), None);
    }

    #[test]
    fn test_product_inquiry_message() {
        let message =
            product_inquiry_message("Oak Vanity", "https://shop.example", "oak-vanity");
        assert_eq!(
            message,
            "Hi, I'm interested in Oak Vanity (https://shop.example/products/oak-vanity)"
        );
    }
}
