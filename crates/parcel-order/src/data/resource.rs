use std::fmt;
use std::io::Read;

use parcel_archive::SpillSource;

/// An opened product stream handed over by the resolver.
///
/// The stream is consumed exactly once, by staging, and dropped afterwards.
pub struct ResourceContainer {
    pub reader:       Box<dyn Read + Send>,
    pub name:         String,
    /// Declared length. `None` when the resolver streams without knowing it.
    pub size:         Option<u64>,
    pub content_type: Option<String>,
}

impl ResourceContainer {
    pub fn new(reader: impl Read + Send + 'static, name: impl Into<String>) -> Self {
        Self {
            reader:       Box::new(reader),
            name:         name.into(),
            size:         None,
            content_type: None,
        }
    }

    #[must_use]
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for ResourceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceContainer")
            .field("reader", &"{ ... }")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// A resource drained into a spill buffer. Cheap to clone; every reader
/// opened from it starts at the first byte.
#[derive(Clone, Debug)]
pub struct StagedResource {
    pub name:         String,
    pub content_type: Option<String>,
    pub content:      SpillSource,
}

impl StagedResource {
    pub fn len(&self) -> u64 { self.content.len() }

    pub fn is_empty(&self) -> bool { self.content.is_empty() }
}
