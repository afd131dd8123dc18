pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod product_images;
pub mod products;
pub mod settings;
