//! Order fulfillment - resolve, stage, package and push.
//!
//! Only two conditions fail an order outright: no products, and no destination
//! that can be pushed to. Everything else degrades the manifest instead. A
//! product that cannot be resolved is left out, and a destination whose
//! packaging or push fails gets no manifest element.

use parcel_deliver::{Deliverer, Destination};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::package::deliver_plan;
use super::resolve::{ResourceResolver, stage};
use crate::config::FulfillmentOptions;
use crate::data::{DeliveryManifest, OrderSpec, PackageElement, StagedResource};
use crate::error::{OrderError, Result};
use crate::plan::plan;

/// Runs orders against a resolver and a deliverer.
///
/// Holds no per-order state, so one instance can serve concurrent orders when
/// `R` and `D` are `Sync`.
pub struct OrderFulfillment<R, D> {
    resolver:  R,
    deliverer: D,
    options:   FulfillmentOptions,
}

impl<R: ResourceResolver, D: Deliverer> OrderFulfillment<R, D> {
    pub fn new(resolver: R, deliverer: D) -> Self {
        Self {
            resolver,
            deliverer,
            options: FulfillmentOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FulfillmentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FulfillmentOptions { &self.options }

    pub fn resolver(&self) -> &R { &self.resolver }

    pub fn deliverer(&self) -> &D { &self.deliverer }

    /// Fulfill `order`, resolving products under `context`.
    ///
    /// # Errors
    ///
    /// [`OrderError::NoProducts`] when the product list is absent or empty, and
    /// [`OrderError::UnsupportedTransport`] when no destination supports push.
    /// Both are checked before anything is resolved.
    pub fn fulfill(&self, order: &OrderSpec, context: &R::Context) -> Result<DeliveryManifest> {
        if !order.has_products() {
            return Err(OrderError::NoProducts);
        }

        let destinations = usable_destinations(&order.destinations);
        if destinations.is_empty() {
            return Err(OrderError::UnsupportedTransport);
        }

        let resources = self.stage_products(order, context);
        let format = order.format();
        let mut manifest = DeliveryManifest::new(order.package_name().map(str::to_string));

        for destination in destinations {
            let base = base_name(order, destination);
            let plan = plan(format, resources.len(), &base, self.options.ordinal_total);
            debug!(
                destination = %destination.authority(),
                format = %format,
                artifacts = plan.artifacts.len(),
                "planned package"
            );

            match deliver_plan(&self.deliverer, destination, &plan, &resources, &self.options) {
                Ok(files) => manifest.push(PackageElement::new(files)),
                Err(error) => {
                    warn!(
                        destination = %destination.authority(),
                        error = %error,
                        "delivery to destination failed, leaving it out of the manifest"
                    );
                }
            }
        }

        info!(
            package = order.package_name().unwrap_or_default(),
            resources = resources.len(),
            destinations = manifest.elements().len(),
            files = manifest.files().count(),
            "order fulfilled"
        );
        Ok(manifest)
    }

    fn stage_products(&self, order: &OrderSpec, context: &R::Context) -> Vec<StagedResource> {
        let products = order.products.as_deref().unwrap_or_default();
        let mut staged = Vec::with_capacity(products.len());

        for (index, product) in products.iter().enumerate() {
            let Some(product) = product else {
                warn!(index, "skipping null product entry");
                continue;
            };

            let container = match self.resolver.resolve(product, context) {
                Ok(container) => container,
                Err(error) => {
                    warn!(product = %product.product_id, error = %error, "failed to resolve product, skipping");
                    continue;
                }
            };

            match stage(container, &self.options) {
                Ok(resource) => staged.push(resource),
                Err(error) => {
                    warn!(product = %product.product_id, error = %error, "failed to stage product, skipping");
                }
            }
        }

        staged
    }
}

fn usable_destinations(destinations: &[Destination]) -> Vec<&Destination> {
    destinations
        .iter()
        .filter(|destination| {
            let usable = destination.transport.supports_push();
            if !usable {
                warn!(
                    destination = %destination.authority(),
                    transport = %destination.transport,
                    "skipping destination with unsupported transport"
                );
            }
            usable
        })
        .collect()
}

fn non_blank(name: Option<&str>) -> Option<&str> { name.filter(|name| !name.trim().is_empty()) }

/// Package identifier, else the destination's suggested name, else a UUID.
fn base_name(order: &OrderSpec, destination: &Destination) -> String {
    non_blank(order.package_name())
        .or_else(|| non_blank(destination.file_name.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
