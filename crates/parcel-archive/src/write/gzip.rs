use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::Result;

/// Compress a single stream into a gzip member.
pub fn gzip<W: Write, R: Read>(sink: W, mut reader: R) -> Result<W> {
    let mut encoder = GzEncoder::new(sink, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    Ok(encoder.finish()?)
}
