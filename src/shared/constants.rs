/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default number of items in the featured / new-arrival strips
pub const DEFAULT_HIGHLIGHT_LIMIT: i64 = 8;

/// Related products shown on a product detail page
pub const RELATED_PRODUCTS_LIMIT: i64 = 4;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Store owner - full back-office access
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Staff - manages catalog and settings
pub const ROLE_ADMIN: &str = "admin";

/// Storefront account - no back-office access
#[cfg_attr(not(test), allow(dead_code))]
pub const ROLE_CUSTOMER: &str = "customer";

// =============================================================================
// PRODUCT IMAGES
// =============================================================================

/// Maximum accepted product image size (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Content types accepted by the product image upload endpoint
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Folder (below the public prefix) where product images are stored
pub const PRODUCT_IMAGE_FOLDER: &str = "products";

// =============================================================================
// SETTINGS
// =============================================================================

/// Settings category exposed publicly to the storefront
pub const STORE_SETTINGS_CATEGORY: &str = "store";

/// Store setting holding the number used for product inquiries
pub const WHATSAPP_NUMBER_KEY: &str = "whatsapp_number";
