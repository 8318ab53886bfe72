use std::path::PathBuf;

use thiserror::Error;

use crate::session::domain::phase::Phase;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("photo fallback is not required in phase {0}")]
    NotRequired(Phase),
    #[error("captured frame is empty")]
    EmptyFrame,
    #[error("unsupported channel count {0}; expected 3 (RGB)")]
    UnsupportedChannels(u8),
    #[error("failed to read {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
