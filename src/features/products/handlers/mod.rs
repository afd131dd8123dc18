mod admin_product_handler;
mod product_handler;

pub use admin_product_handler::*;
pub use product_handler::*;
