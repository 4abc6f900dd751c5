//! Container writers.
//!
//! Each writer consumes its inputs in order, appends them to `sink` and hands
//! the sink back once the container trailer has been written.

use std::io::{self, Read};

#[cfg(feature = "zip")]
mod zip;
#[cfg(feature = "tar")]
mod tar;
mod gzip;

#[cfg(feature = "zip")]
pub use self::zip::zip;
#[cfg(feature = "tar")]
pub use self::tar::{DEFAULT_TAR_MODE, TarOptions, tar};
pub use self::gzip::gzip;

/// One named input stream for a multi-entry container.
pub struct Entry<R> {
    pub name:   String,
    pub reader: R,
    /// Exact byte length of `reader`.
    pub size:   u64,
}

impl<R: Read> Entry<R> {
    pub fn new(name: impl Into<String>, reader: R, size: u64) -> Self {
        Self {
            name: name.into(),
            reader,
            size,
        }
    }
}

/// Counts bytes pulled through the inner reader.
pub(crate) struct Counted<R> {
    inner: R,
    count: u64,
}

impl<R> Counted<R> {
    pub(crate) fn new(inner: R) -> Self { Self { inner, count: 0 } }

    pub(crate) fn count(&self) -> u64 { self.count }
}

impl<R: Read> Read for Counted<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
