//! Product catalog and back-office product management.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/products` | No | Filtered, paginated catalog |
//! | GET | `/api/products/featured` | No | Featured products |
//! | GET | `/api/products/new-arrivals` | No | New arrivals |
//! | GET | `/api/products/{slug}` | No | Product page with reviews and related products |
//! | GET | `/api/admin/products` | Admin | Products in any status |
//! | GET | `/api/admin/products/{id}` | Admin | Product by ID |
//! | POST | `/api/admin/products` | Admin | Create product |
//! | PUT | `/api/admin/products/{id}` | Admin | Update product |
//! | DELETE | `/api/admin/products/{id}` | Admin | Delete product |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ProductService;
