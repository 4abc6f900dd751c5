//! Order fulfillment: stage products, package them and push the result.
//!
//! # Architecture
//!
//! - [`data`] - Order input, packaging formats, staged resources, manifest
//! - [`plan`] - Pure mapping from format and resource count to artifacts
//! - [`effects`] - Resolver seam, staging, artifact building, [`OrderFulfillment`]
//! - [`config`] - Tunables loadable from TOML
//!
//! ```no_run
//! # use parcel_order::{OrderFulfillment, OrderSpec, ProductRef, PackagingFormat, ResourceResolver};
//! # use parcel_order::{ResourceContainer, ResolveError};
//! # use parcel_deliver::{Destination, ReqwestDeliverer};
//! struct Library;
//!
//! impl ResourceResolver for Library {
//!     type Context = ();
//!
//!     fn resolve(&self, product: &ProductRef, _: &()) -> Result<ResourceContainer, ResolveError> {
//!         Err(ResolveError::NotFound(product.product_id.clone()))
//!     }
//! }
//!
//! let fulfillment = OrderFulfillment::new(Library, ReqwestDeliverer::new()?);
//! let order = OrderSpec::new()
//!     .product(ProductRef::new("img-0001"))
//!     .packaging("batch-7", PackagingFormat::TarGzip)
//!     .destination(Destination::https("drop.example.org", 443).path("incoming"));
//! let manifest = fulfillment.fulfill(&order, &())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data;
pub mod effects;
mod error;
pub mod plan;

pub use config::{DEFAULT_STAGING_THRESHOLD, FulfillmentOptions, OrdinalTotal, ParcelConfig};
pub use data::{
    DeliveryManifest, OrderSpec, PackageElement, PackagingFormat, PackagingSpec, ProductRef,
    ResourceContainer, StagedResource,
};
pub use effects::{OrderFulfillment, ResourceResolver, stage};
pub use error::{ConfigError, FormatError, OrderError, PackageError, ResolveError, Result};
pub use plan::{Artifact, ArtifactType, Outer, PackagePlan, Recipe};
