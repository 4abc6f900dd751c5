use std::collections::HashSet;
use std::io::{self, Read, Seek, Write};

use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use super::Entry;
use crate::Result;

// Entries at or past this size need zip64 extra fields.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Write every entry into a deflated zip archive.
///
/// An entry whose name was already written is skipped, so the first
/// occurrence of a name wins. Returns the sink and the names actually written,
/// in order.
pub fn zip<W, R, I>(sink: W, entries: I) -> Result<(W, Vec<String>)>
where
    W: Write + Seek,
    R: Read,
    I: IntoIterator<Item = Entry<R>>,
{
    let mut writer = zip::ZipWriter::new(sink);
    let mut seen = HashSet::new();
    let mut written = Vec::new();

    for mut entry in entries {
        if !seen.insert(entry.name.clone()) {
            debug!(entry = %entry.name, "skipping duplicate zip entry");
            continue;
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(entry.size >= ZIP64_THRESHOLD);
        writer.start_file(entry.name.clone(), options)?;
        io::copy(&mut entry.reader, &mut writer)?;
        written.push(entry.name);
    }

    let sink = writer.finish()?;
    Ok((sink, written))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn entry(name: &str, data: &'static [u8]) -> Entry<&'static [u8]> {
        Entry::new(name, data, data.len() as u64)
    }

    fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
        let mut file = archive.by_name(name).unwrap();
        let mut out = Vec::new();
        file.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn writes_entries_in_input_order() {
        let (sink, written) = zip(
            Cursor::new(Vec::new()),
            [entry("b.txt", b"bravo"), entry("a.txt", b"alpha")],
        )
        .unwrap();
        assert_eq!(written, ["b.txt", "a.txt"]);

        let mut archive = zip::ZipArchive::new(Cursor::new(sink.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "b.txt");
        assert_eq!(archive.by_index(1).unwrap().name(), "a.txt");
        assert_eq!(read_entry(&mut archive, "a.txt"), b"alpha");
    }

    #[test]
    fn duplicate_names_keep_first() {
        let (sink, written) = zip(
            Cursor::new(Vec::new()),
            [
                entry("same.bin", b"first"),
                entry("other.bin", b"other"),
                entry("same.bin", b"second"),
            ],
        )
        .unwrap();
        assert_eq!(written, ["same.bin", "other.bin"]);

        let mut archive = zip::ZipArchive::new(Cursor::new(sink.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(read_entry(&mut archive, "same.bin"), b"first");
    }

    #[test]
    fn empty_input_is_valid_archive() {
        let (sink, written) =
            zip(Cursor::new(Vec::new()), Vec::<Entry<&[u8]>>::new()).unwrap();
        assert!(written.is_empty());
        let archive = zip::ZipArchive::new(Cursor::new(sink.into_inner())).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
