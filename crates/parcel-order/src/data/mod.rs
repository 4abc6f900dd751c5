//! Order input, staged resources and the delivery manifest.

mod format;
mod manifest;
mod order;
mod resource;

pub use format::PackagingFormat;
pub use manifest::{DeliveryManifest, PackageElement};
pub use order::{OrderSpec, PackagingSpec, ProductRef};
pub use resource::{ResourceContainer, StagedResource};
