pub mod config;
pub mod constants;
pub mod device;
pub mod error;
pub mod frame;
