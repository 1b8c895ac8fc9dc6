pub mod document;
pub mod image;
pub mod utils;

// Re-export handler functions for use in routing
pub use document::delete;
pub use document::get as list;
pub use document::post as upload;

pub use image::post as upload_image;
