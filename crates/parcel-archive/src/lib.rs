//! Archive construction over bounded-memory spill buffers.
//!
//! # Architecture
//!
//! - `spill.rs` - Memory-first sink that overflows to a temp file
//! - `write/` - Per-container writers (zip, tar, gzip)

pub use error::{Error, Result};
pub use spill::{DEFAULT_THRESHOLD, SpillBuffer, SpillReader, SpillSource};
pub use write::{Entry, gzip};

#[cfg(feature = "tar")]
pub use write::{DEFAULT_TAR_MODE, TarOptions, tar};
#[cfg(feature = "zip")]
pub use write::zip;

mod error;
mod spill;
pub mod write;
