//! Product image storage.
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/admin/products/upload-image` | Admin | Upload (multipart `file`), returns `{url, path}` |
//! | DELETE | `/api/admin/products/upload-image?path=` | Admin | Remove an uploaded image |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::ProductImageService;
