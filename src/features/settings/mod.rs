//! Store settings (key/value, JSONB values).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/settings/store` | No | Storefront settings as `{key: value}` |
//! | GET | `/api/admin/settings` | Admin | All settings grouped by category |
//! | PUT | `/api/admin/settings` | Admin | Update values: `{settings: {key: {value}}}` |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SettingsService;
