//! Fulfillment configuration, loadable from TOML.
//!
//! ```toml
//! [fulfillment]
//! spill_threshold = 1048576
//! staging_threshold = 262144
//! ordinal_total = "count"
//!
//! [push]
//! timeout_ms = 30000
//! require_success = true
//! ```

use std::path::{Path, PathBuf};

use parcel_archive::{DEFAULT_TAR_MODE, DEFAULT_THRESHOLD, SpillBuffer, TarOptions};
use parcel_deliver::PushOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const MB: usize = 1024 * 1024;

/// Default in-memory ceiling for each staged product.
pub const DEFAULT_STAGING_THRESHOLD: usize = 8 * MB;

/// How the second number of a multi-file ordinal suffix is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdinalTotal {
    /// One more than the file count: three files are `.01.04` to `.03.04`.
    #[default]
    CountPlusOne,
    /// The file count itself.
    Count,
}

impl OrdinalTotal {
    pub fn total(self, count: usize) -> usize {
        match self {
            Self::CountPlusOne => count + 1,
            Self::Count => count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FulfillmentOptions {
    /// Bytes held in memory per artifact buffer before spilling to disk.
    pub spill_threshold:   usize,
    /// Bytes held in memory per staged product. Every product of an order is
    /// staged before packaging, so staging alone can hold up to
    /// `products * staging_threshold` bytes.
    pub staging_threshold: usize,
    /// Where spill files go. `None` uses the system temp dir.
    pub spill_dir:         Option<PathBuf>,
    pub ordinal_total:     OrdinalTotal,
    /// Permission bits for tar entries.
    pub tar_mode:          u32,
}

impl Default for FulfillmentOptions {
    fn default() -> Self {
        Self {
            spill_threshold:   DEFAULT_THRESHOLD,
            staging_threshold: DEFAULT_STAGING_THRESHOLD,
            spill_dir:         None,
            ordinal_total:     OrdinalTotal::default(),
            tar_mode:          DEFAULT_TAR_MODE,
        }
    }
}

impl FulfillmentOptions {
    #[must_use]
    pub fn spill_threshold(mut self, threshold: usize) -> Self {
        self.spill_threshold = threshold;
        self
    }

    #[must_use]
    pub fn staging_threshold(mut self, threshold: usize) -> Self {
        self.staging_threshold = threshold;
        self
    }

    #[must_use]
    pub fn spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn ordinal_total(mut self, ordinal_total: OrdinalTotal) -> Self {
        self.ordinal_total = ordinal_total;
        self
    }

    #[must_use]
    pub fn tar_mode(mut self, mode: u32) -> Self {
        self.tar_mode = mode;
        self
    }

    fn buffer(&self, threshold: usize) -> SpillBuffer {
        match &self.spill_dir {
            Some(dir) => SpillBuffer::with_dir(threshold, dir),
            None => SpillBuffer::new(threshold),
        }
    }

    /// A fresh artifact buffer honoring the spill threshold and dir.
    pub fn spill_buffer(&self) -> SpillBuffer { self.buffer(self.spill_threshold) }

    /// A fresh buffer for staging one product.
    pub fn staging_buffer(&self) -> SpillBuffer { self.buffer(self.staging_threshold) }

    pub fn tar_options(&self) -> TarOptions { TarOptions::default().mode(self.tar_mode) }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(s)?) }
}

/// Top-level configuration file: fulfillment plus push settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcelConfig {
    pub fulfillment: FulfillmentOptions,
    pub push:        PushOptions,
}

impl ParcelConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(s)?) }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}
