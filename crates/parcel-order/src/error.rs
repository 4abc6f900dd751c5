//! Error types for parcel-order.

use std::io;
use thiserror::Error;

/// Rejections that fail a whole order before any delivery is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("no products specified for the order")]
    NoProducts,

    #[error("no destination uses a supported transport (only HTTP(S) push is supported)")]
    UnsupportedTransport,
}

/// Failure to obtain one product's content. Recovered by skipping the product.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("product '{0}' not found")]
    NotFound(String),

    #[error("product '{0}' cannot be retrieved as a resource")]
    Unsupported(String),

    #[error("not authorized to retrieve product '{0}'")]
    Unauthorized(String),

    #[error("security context failed to execute retrieval: {0}")]
    Execution(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure while building or pushing one destination's artifacts.
/// Recovered by leaving that destination out of the manifest.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("archive construction failed: {0}")]
    Archive(#[from] parcel_archive::Error),

    #[error("delivery failed: {0}")]
    Deliver(#[from] parcel_deliver::DeliverError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown packaging format '{0}'")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, OrderError>;
