use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[cfg(feature = "zip")]
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("entry '{name}' ended after {actual} of {declared} bytes")]
    ShortEntry {
        name:     String,
        declared: u64,
        actual:   u64,
    },

    #[error("failed to create spill file in '{dir}': {source}")]
    SpillFailed { dir: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
