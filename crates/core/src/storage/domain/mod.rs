pub mod classification_cache;
pub mod key_value_store;
pub mod progress_store;
