//! Object storage for product images
//!
//! S3-compatible (MinIO, AWS S3, R2) client used by the admin image upload.

mod storage_client;

pub use storage_client::StorageClient;
