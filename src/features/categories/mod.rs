//! Product categories.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/categories` | No | Active categories (flat or `?tree=true`) |
//! | GET | `/api/categories/{slug}` | No | Active category by slug |
//! | GET | `/api/admin/categories` | Admin | Categories with parent and level |
//! | GET | `/api/admin/categories/{id}` | Admin | Category with parent and children |
//! | POST | `/api/admin/categories` | Admin | Create category |
//! | PUT | `/api/admin/categories/{id}` | Admin | Update category |
//! | DELETE | `/api/admin/categories/{id}` | Admin | Delete childless, unused category |

pub mod dtos;
pub mod handlers;
pub mod hierarchy;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
