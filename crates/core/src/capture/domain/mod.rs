pub mod capture_error;
pub mod image_writer;
pub mod still_source;
