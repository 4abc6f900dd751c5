//! Error types for parcel-deliver.

use std::io;
use thiserror::Error;

use crate::data::Transport;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DeliverError {
    #[error("invalid push URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("transport '{0}' does not support push delivery")]
    UnsupportedTransport(Transport),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] BoxError),

    #[error("push to {url} failed: {source}")]
    Transport {
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("push to {url} rejected with status {status}")]
    Status { url: String, status: u16 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DeliverError>;
