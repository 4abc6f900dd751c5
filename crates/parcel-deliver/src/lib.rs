//! Synchronous push delivery of sized byte streams.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Destinations, credentials, payloads and options
//! - [`core`] - Pure URL construction and status classification
//! - [`effects`] - The [`Deliverer`] seam and its `reqwest` implementation
//!
//! A push is fire-and-forget by default: it succeeds when the request
//! completes, whatever the remote status. Set
//! [`PushOptions::require_success`] to demand a 2xx response.

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use self::core::{is_success, target_url};
pub use self::data::{Credentials, Destination, Payload, PushOptions, Transport};
pub use self::effects::Deliverer;

#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestDeliverer;

pub use self::error::{DeliverError, Result};
