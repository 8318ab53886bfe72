pub mod domain;
pub mod infrastructure;
pub mod photo_capture_use_case;
