mod image_upload_dto;

pub use image_upload_dto::*;
