mod image_upload_handler;

pub use image_upload_handler::*;
