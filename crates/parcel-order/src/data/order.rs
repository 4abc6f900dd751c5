use parcel_deliver::Destination;
use serde::{Deserialize, Serialize};

use super::PackagingFormat;

/// Reference to one previously identified product.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRef {
    pub product_id: String,
    /// Library or source the product was discovered in.
    #[serde(default)]
    pub source_id:  Option<String>,
}

impl ProductRef {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            source_id:  None,
        }
    }

    #[must_use]
    pub fn source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingSpec {
    pub package_identifier: String,
    #[serde(default)]
    pub format:             PackagingFormat,
}

impl PackagingSpec {
    pub fn new(package_identifier: impl Into<String>, format: PackagingFormat) -> Self {
        Self {
            package_identifier: package_identifier.into(),
            format,
        }
    }
}

/// An order as received from the request layer.
///
/// `products` mirrors the wire shape: the list itself may be absent and any
/// entry may be null.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    #[serde(default)]
    pub products:     Option<Vec<Option<ProductRef>>>,
    #[serde(default)]
    pub packaging:    Option<PackagingSpec>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl OrderSpec {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn product(mut self, product: ProductRef) -> Self {
        self.products.get_or_insert_with(Vec::new).push(Some(product));
        self
    }

    #[must_use]
    pub fn products(mut self, products: impl IntoIterator<Item = Option<ProductRef>>) -> Self {
        self.products.get_or_insert_with(Vec::new).extend(products);
        self
    }

    #[must_use]
    pub fn packaging(mut self, package_identifier: impl Into<String>, format: PackagingFormat) -> Self {
        self.packaging = Some(PackagingSpec::new(package_identifier, format));
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn has_products(&self) -> bool {
        self.products.as_ref().is_some_and(|products| !products.is_empty())
    }

    pub fn format(&self) -> PackagingFormat {
        self.packaging.as_ref().map(|spec| spec.format).unwrap_or_default()
    }

    /// The package identifier, when one was given.
    pub fn package_name(&self) -> Option<&str> {
        self.packaging.as_ref().map(|spec| spec.package_identifier.as_str())
    }
}
