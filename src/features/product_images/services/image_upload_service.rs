use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::product_images::dtos::{extension_for, UploadedImageDto};
use crate::modules::storage::StorageClient;
use crate::shared::constants::PRODUCT_IMAGE_FOLDER;
use crate::shared::slug::random_base36;

const NAME_TOKEN_LEN: u32 = 6;

/// Stores product images in the public part of the bucket
pub struct ProductImageService {
    storage: Arc<StorageClient>,
}

impl ProductImageService {
    pub fn new(storage: Arc<StorageClient>) -> Self {
        Self { storage }
    }

    /// Upload an already validated image and return its public URL
    pub async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<UploadedImageDto> {
        let extension = extension_for(content_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type '{}'", content_type))
        })?;
        let path = image_path(Utc::now().timestamp_millis(), extension);

        self.storage.upload(&path, &data, content_type).await?;
        info!("Uploaded product image {} ({} bytes)", path, data.len());

        Ok(UploadedImageDto {
            url: self.storage.public_url(&path),
            path,
        })
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.storage.delete(path).await?;
        info!("Deleted product image {}", path);
        Ok(())
    }
}

/// `products/{unix_millis}-{token}.{ext}`
fn image_path(millis: i64, extension: &str) -> String {
    format!(
        "{}/{}-{}.{}",
        PRODUCT_IMAGE_FOLDER,
        millis,
        random_base36(NAME_TOKEN_LEN).to_lowercase(),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::product_images::dtos::is_product_image_path;

    #[test]
    fn test_image_path_layout() {
        let path = image_path(1714564800000, "webp");
        assert!(path.starts_with("products/1714564800000-"));
        assert!(path.ends_with(".webp"));
        assert!(is_product_image_path(&path));
        assert_ne!(path, image_path(1714564800000, "webp"));
    }
}
