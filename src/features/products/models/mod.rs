mod product;
mod product_image;
mod review;

pub use product::*;
pub use product_image::*;
pub use review::*;
