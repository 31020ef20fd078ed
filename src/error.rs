use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0:?}: not found or is not a directory")]
    DirectoryNotFound(PathBuf),

    #[error("{0:?}: not found or is not a csv file")]
    CsvNotFound(PathBuf),

    #[error("alpha must be between 0.0 and 1.0 inclusive, got {0}")]
    AlphaOutOfRange(f64),

    #[error("target must be between 0.0 and 1.0 inclusive, got {0}")]
    TargetOutOfRange(f64),

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// base, overlay and mask must share spatial dimensions
    #[error("dimension mismatch: base {base:?}, overlay {overlay:?}, mask {mask:?}")]
    DimensionMismatch {
        base: (u32, u32),
        overlay: (u32, u32),
        mask: (u32, u32),
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
