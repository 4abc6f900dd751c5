use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormatError;
use crate::plan::{Outer, Recipe};

const OCTET_STREAM: &str = "application/octet-stream";

/// Packaging and compression requested for an order.
///
/// The wire tokens are the NSILI ones (`FILESUNC`, `TARGZIP`, ...). Parsing is
/// case-insensitive and ignores spaces, so `"TAR GZIP"` is accepted too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PackagingFormat {
    /// Each product sent as its own file, untouched.
    #[default]
    FilesUncompressed,
    /// Each product wrapped in its own zip.
    FilesCompressed,
    /// All products in one zip.
    FilesZip,
    /// Each product wrapped in its own gzip.
    FilesGzip,
    TarUncompressed,
    /// Tar wrapped in zip, labelled as compress output.
    TarCompressed,
    TarZip,
    TarGzip,
}

impl PackagingFormat {
    pub const ALL: [PackagingFormat; 8] = [
        Self::FilesUncompressed,
        Self::FilesCompressed,
        Self::FilesZip,
        Self::FilesGzip,
        Self::TarUncompressed,
        Self::TarCompressed,
        Self::TarZip,
        Self::TarGzip,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::FilesUncompressed => "FILESUNC",
            Self::FilesCompressed => "FILESCOMPRESS",
            Self::FilesZip => "FILESZIP",
            Self::FilesGzip => "FILESGZIP",
            Self::TarUncompressed => "TARUNC",
            Self::TarCompressed => "TARCOMPRESS",
            Self::TarZip => "TARZIP",
            Self::TarGzip => "TARGZIP",
        }
    }

    /// Suffix appended to delivered file names, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::FilesUncompressed => "",
            Self::FilesCompressed => ".Z",
            Self::FilesZip => ".zip",
            Self::FilesGzip => ".gz",
            Self::TarUncompressed => ".tar",
            Self::TarCompressed => ".tar.Z",
            Self::TarZip => ".tar.zip",
            Self::TarGzip => ".tar.gz",
        }
    }

    /// Content type of delivered files. Uncompressed files normally carry the
    /// product's own type; this is the fallback when it has none.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::FilesUncompressed => OCTET_STREAM,
            Self::FilesCompressed | Self::TarCompressed => "application/x-compress",
            Self::FilesZip | Self::TarZip => "application/zip",
            Self::FilesGzip | Self::TarGzip => "application/gzip",
            Self::TarUncompressed => "application/x-tar",
        }
    }

    pub fn recipe(self) -> Recipe {
        match self {
            Self::FilesUncompressed => Recipe::Passthrough,
            Self::FilesCompressed => Recipe::EachZip,
            Self::FilesGzip => Recipe::EachGzip,
            Self::FilesZip => Recipe::Zip,
            Self::TarUncompressed => Recipe::Tar,
            Self::TarZip | Self::TarCompressed => Recipe::TarThen(Outer::Zip),
            Self::TarGzip => Recipe::TarThen(Outer::Gzip),
        }
    }
}

impl fmt::Display for PackagingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.token()) }
}

impl FromStr for PackagingFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|format| format.token() == normalized)
            .ok_or_else(|| FormatError::Unknown(s.to_string()))
    }
}

impl Serialize for PackagingFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for PackagingFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
