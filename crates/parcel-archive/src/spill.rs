//! Memory-first write sink that overflows into an anonymous temp file.
//!
//! A [`SpillBuffer`] accepts writes (and seeks, so zip central directories can
//! be patched) and keeps everything in a `Vec` until the write position would
//! pass the threshold. At that point the buffered bytes move into a temp file
//! and all further I/O goes to disk. [`SpillBuffer::finish`] freezes the
//! content into a [`SpillSource`] that can be opened any number of times.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Error;

const MB: usize = 1024 * 1024;

/// Default in-memory ceiling before a buffer spills to disk.
pub const DEFAULT_THRESHOLD: usize = 100 * MB;

const SPILL_PREFIX: &str = "parcel-spill-";

enum Store {
    Memory(Cursor<Vec<u8>>),
    Disk(NamedTempFile),
}

pub struct SpillBuffer {
    store:     Store,
    threshold: usize,
    dir:       Option<PathBuf>,
}

impl Default for SpillBuffer {
    fn default() -> Self { Self::new(DEFAULT_THRESHOLD) }
}

impl SpillBuffer {
    /// Buffer up to `threshold` bytes in memory, then spill to the system temp dir.
    pub fn new(threshold: usize) -> Self {
        Self {
            store: Store::Memory(Cursor::new(Vec::new())),
            threshold,
            dir: None,
        }
    }

    /// Like [`SpillBuffer::new`], but spill files are created under `dir`.
    pub fn with_dir(threshold: usize, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::new(threshold)
        }
    }

    pub fn threshold(&self) -> usize { self.threshold }

    pub fn is_spilled(&self) -> bool { matches!(self.store, Store::Disk(_)) }

    fn spill_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn create_spill_file(&self) -> io::Result<NamedTempFile> {
        let dir = self.spill_dir();
        tempfile::Builder::new()
            .prefix(SPILL_PREFIX)
            .tempfile_in(&dir)
            .map_err(|source| {
                let kind = source.kind();
                io::Error::new(kind, Error::SpillFailed { dir, source })
            })
    }

    fn spill(&mut self) -> io::Result<()> {
        let Store::Memory(cursor) = &self.store else {
            return Ok(());
        };
        let buffered = cursor.get_ref().len();
        let position = cursor.position();

        let mut file = self.create_spill_file()?;
        if let Store::Memory(cursor) = &self.store {
            file.write_all(cursor.get_ref())?;
        }
        file.seek(SeekFrom::Start(position))?;

        debug!(
            buffered,
            threshold = self.threshold,
            path = %file.path().display(),
            "spill buffer moved to disk"
        );
        self.store = Store::Disk(file);
        Ok(())
    }

    /// Freeze the written bytes into a re-openable source.
    pub fn finish(self) -> io::Result<SpillSource> {
        match self.store {
            Store::Memory(cursor) => Ok(SpillSource::from_bytes(cursor.into_inner())),
            Store::Disk(mut file) => {
                file.flush()?;
                let len = file.as_file().metadata()?.len();
                Ok(SpillSource {
                    repr: Repr::Disk(Arc::new(file)),
                    len,
                })
            }
        }
    }
}

impl Write for SpillBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Store::Memory(cursor) = &self.store {
            let end = cursor.position().saturating_add(buf.len() as u64);
            if end > self.threshold as u64 {
                self.spill()?;
            }
        }
        match &mut self.store {
            Store::Memory(cursor) => cursor.write(buf),
            Store::Disk(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.store {
            Store::Memory(_) => Ok(()),
            Store::Disk(file) => file.flush(),
        }
    }
}

impl Seek for SpillBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.store {
            Store::Memory(cursor) => cursor.seek(pos),
            Store::Disk(file) => file.seek(pos),
        }
    }
}

#[derive(Clone, Debug)]
enum Repr {
    Memory(Bytes),
    Disk(Arc<NamedTempFile>),
}

/// Frozen content of a [`SpillBuffer`].
///
/// Cloning is cheap and shares the underlying storage; the spill file is
/// removed once the last clone and the last open reader are dropped.
#[derive(Clone, Debug)]
pub struct SpillSource {
    repr: Repr,
    len:  u64,
}

impl SpillSource {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self {
            repr: Repr::Memory(bytes),
            len,
        }
    }

    pub fn len(&self) -> u64 { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn is_spilled(&self) -> bool { matches!(self.repr, Repr::Disk(_)) }

    /// Path of the backing spill file, if the content lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.repr {
            Repr::Memory(_) => None,
            Repr::Disk(file) => Some(file.path()),
        }
    }

    /// Open a fresh reader positioned at the start of the content.
    ///
    /// Readers are independent of each other and of the source.
    pub fn open(&self) -> io::Result<SpillReader> {
        match &self.repr {
            Repr::Memory(bytes) => Ok(SpillReader::Memory(Cursor::new(bytes.clone()))),
            Repr::Disk(file) => Ok(SpillReader::Disk {
                file:   file.reopen()?.take(self.len),
                _guard: Arc::clone(file),
            }),
        }
    }

    /// Read the whole content into memory.
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len as usize);
        self.open()?.read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Owned reader over a [`SpillSource`].
pub enum SpillReader {
    Memory(Cursor<Bytes>),
    Disk {
        file:   io::Take<File>,
        _guard: Arc<NamedTempFile>,
    },
}

impl Read for SpillReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Memory(cursor) => cursor.read(buf),
            Self::Disk { file, .. } => file.read(buf),
        }
    }
}
