use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use tar::{Builder, EntryType, Header};
use tracing::debug;

use super::{Counted, Entry};
use crate::error::{Error, Result};

/// Permission bits stamped on every tar entry.
pub const DEFAULT_TAR_MODE: u32 = 0o660;

/// Header metadata shared by all entries of one tar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TarOptions {
    pub mode:  u32,
    /// Seconds since the epoch; `None` stamps the time the archive is built.
    pub mtime: Option<u64>,
}

impl Default for TarOptions {
    fn default() -> Self {
        Self {
            mode:  DEFAULT_TAR_MODE,
            mtime: None,
        }
    }
}

impl TarOptions {
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub fn mtime(mut self, mtime: u64) -> Self {
        self.mtime = Some(mtime);
        self
    }
}

// Used when a display name has no usable component left.
const UNNAMED_ENTRY: &str = "unnamed";

/// Tar headers only take relative paths without `..`. Keep the normal
/// components of `name`, so `/abs/scene.ntf` is stored as `abs/scene.ntf`.
fn entry_path(name: &str) -> String {
    let parts: Vec<&str> = name
        .split(['/', '\\'])
        .filter(|part| !matches!(*part, "" | "." | ".."))
        .collect();
    if parts.is_empty() {
        UNNAMED_ENTRY.to_string()
    } else {
        parts.join("/")
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Write every entry as a regular file into a tar archive.
///
/// Entries are not deduplicated. Names are stored relative, with `.` and `..`
/// components dropped. Each reader must yield exactly `size` bytes;
/// a short reader leaves a corrupt archive and is reported as
/// [`Error::ShortEntry`].
pub fn tar<W, R, I>(sink: W, entries: I, options: TarOptions) -> Result<W>
where
    W: Write,
    R: Read,
    I: IntoIterator<Item = Entry<R>>,
{
    let mtime = options.mtime.unwrap_or_else(now_secs);
    let mut builder = Builder::new(sink);

    for entry in entries {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(entry.size);
        header.set_mode(options.mode);
        header.set_mtime(mtime);

        let path = entry_path(&entry.name);
        if path != entry.name {
            debug!(entry = %entry.name, stored = %path, "tar entry name rewritten");
        }

        let mut data = Counted::new(entry.reader.take(entry.size));
        builder.append_data(&mut header, &path, &mut data)?;
        if data.count() != entry.size {
            return Err(Error::ShortEntry {
                name:     entry.name,
                declared: entry.size,
                actual:   data.count(),
            });
        }
    }

    Ok(builder.into_inner()?)
}
