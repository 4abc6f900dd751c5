//! Pure packaging planner.
//!
//! Maps a format and a resource count to the list of artifacts that will be
//! pushed to each destination. Nothing here touches bytes; the effects layer
//! walks the plan and builds each artifact.

use crate::config::OrdinalTotal;
use crate::data::PackagingFormat;

/// How an artifact's bytes are produced from its member resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipe {
    /// Resource bytes sent unchanged.
    Passthrough,
    /// One zip per resource.
    EachZip,
    /// One gzip stream per resource.
    EachGzip,
    /// All resources in one deduplicated zip.
    Zip,
    /// All resources in one tar.
    Tar,
    /// All resources in one tar, wrapped again by `Outer`.
    TarThen(Outer),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outer {
    Zip,
    Gzip,
}

impl Recipe {
    /// Whether every resource becomes its own artifact.
    pub fn is_per_file(self) -> bool {
        matches!(self, Self::Passthrough | Self::EachZip | Self::EachGzip)
    }
}

/// Content type of a planned artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactType {
    Fixed(&'static str),
    /// Use the member resource's own type, falling back to the format's.
    Original,
}

/// One file to build and push.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub file_name:    String,
    pub content_type: ArtifactType,
    /// Indices into the staged resource list, in entry order.
    pub members:      Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackagePlan {
    pub format:    PackagingFormat,
    pub recipe:    Recipe,
    pub base:      String,
    pub artifacts: Vec<Artifact>,
}

impl PackagePlan {
    /// Entry name of the tar nested inside a `TarThen` artifact.
    pub fn nested_tar_name(&self) -> String { format!("{}.tar", self.base) }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|artifact| artifact.file_name.as_str())
    }
}

/// Plan the artifacts for `count` staged resources.
///
/// Per-file recipes yield one artifact per resource. With more than one
/// resource they are named `<base>.<i>.<total><ext>`, two-digit ordinals
/// starting at 1. Collective recipes yield exactly one `<base><ext>`.
/// A count of zero plans nothing.
pub fn plan(format: PackagingFormat, count: usize, base: &str, ordinal: OrdinalTotal) -> PackagePlan {
    let recipe = format.recipe();
    let ext = format.extension();
    let content_type = match recipe {
        Recipe::Passthrough => ArtifactType::Original,
        _ => ArtifactType::Fixed(format.content_type()),
    };

    let artifacts = if count == 0 {
        Vec::new()
    } else if recipe.is_per_file() && count > 1 {
        let total = ordinal.total(count);
        (0..count)
            .map(|index| Artifact {
                file_name: format!("{base}.{:02}.{total:02}{ext}", index + 1),
                content_type,
                members: vec![index],
            })
            .collect()
    } else {
        vec![Artifact {
            file_name: format!("{base}{ext}"),
            content_type,
            members: (0..count).collect(),
        }]
    };

    PackagePlan {
        format,
        recipe,
        base: base.to_string(),
        artifacts,
    }
}
