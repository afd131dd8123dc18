use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{ALLOWED_IMAGE_TYPES, PRODUCT_IMAGE_FOLDER};

/// Multipart body of the image upload, for Swagger UI only.
/// The handler reads the form with axum's `Multipart` extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadProductImageDto {
    /// JPEG, PNG, WebP or GIF, at most 5MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedImageDto {
    /// Public URL to store in `product_images.url`
    pub url: String,
    /// Storage path, used to delete the object again
    #[schema(example = "products/1714564800000-K2Q9ZT.png")]
    pub path: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteImageQuery {
    /// Path returned by the upload endpoint
    pub path: Option<String>,
}

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// File extension for an accepted image content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// A deletable path stays inside the product image folder
pub fn is_product_image_path(path: &str) -> bool {
    path.strip_prefix(PRODUCT_IMAGE_FOLDER)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| !name.is_empty() && !name.split('/').any(|s| s == ".." || s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_allowed_type_has_an_extension() {
        for content_type in ALLOWED_IMAGE_TYPES {
            assert!(extension_for(content_type).is_some(), "{}", content_type);
        }
        assert_eq!(extension_for("image/jpg"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
        assert!(!is_allowed_image_type("image/svg+xml"));
    }

    #[test]
    fn test_product_image_path() {
        assert!(is_product_image_path("products/1714564800000-ab12.png"));
        assert!(!is_product_image_path("products/"));
        assert!(!is_product_image_path("products/../secrets.txt"));
        assert!(!is_product_image_path("products//x.png"));
        assert!(!is_product_image_path("avatars/x.png"));
        assert!(!is_product_image_path("productsx/a.png"));
    }
}
