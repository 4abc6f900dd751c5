use serde::{Deserialize, Serialize};

/// Files actually pushed to one destination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageElement {
    files: Vec<String>,
}

impl PackageElement {
    pub fn new(files: Vec<String>) -> Self { Self { files } }

    pub fn files(&self) -> &[String] { &self.files }

    pub fn into_files(self) -> Vec<String> { self.files }
}

/// Result of fulfilling an order: one element per destination that was served.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package_name: Option<String>,
    #[serde(default)]
    elements:     Vec<PackageElement>,
}

impl DeliveryManifest {
    pub fn new(package_name: Option<String>) -> Self {
        Self {
            package_name,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: PackageElement) { self.elements.push(element); }

    pub fn package_name(&self) -> Option<&str> { self.package_name.as_deref() }

    pub fn elements(&self) -> &[PackageElement] { &self.elements }

    /// Every delivered file name across all destinations, in order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .flat_map(|element| element.files.iter().map(String::as_str))
    }
}
