use crate::data::{Destination, Payload};
use crate::error::Result;

/// Synchronous push of one named file to a destination.
///
/// This is the seam between packaging and the network: orchestration code
/// only ever talks to a `Deliverer`, so tests can record pushes instead of
/// performing them.
///
/// # Implementations
///
/// - [`ReqwestDeliverer`]: production implementation using `reqwest::blocking`
/// - Recording implementations for testing
pub trait Deliverer {
    /// Send `payload` as `name` under the destination's path.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built or the transfer fails at the
    /// transport level. Whether an unsuccessful HTTP status is an error is up to
    /// the implementation.
    fn push(
        &self,
        destination: &Destination,
        name: &str,
        content_type: &str,
        payload: Payload,
    ) -> Result<()>;
}

impl<D: Deliverer + ?Sized> Deliverer for &D {
    fn push(
        &self,
        destination: &Destination,
        name: &str,
        content_type: &str,
        payload: Payload,
    ) -> Result<()> {
        (**self).push(destination, name, content_type, payload)
    }
}

impl<D: Deliverer + ?Sized> Deliverer for Box<D> {
    fn push(
        &self,
        destination: &Destination,
        name: &str,
        content_type: &str,
        payload: Payload,
    ) -> Result<()> {
        (**self).push(destination, name, content_type, payload)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use reqwest::blocking::{Body, Client};
    use reqwest::header::CONTENT_TYPE;
    use tracing::{debug, warn};

    use super::*;
    use crate::core::{is_success, target_url};
    use crate::data::PushOptions;
    use crate::error::DeliverError;

    /// Production push client built on `reqwest::blocking`.
    ///
    /// Files are sent with `PUT`, a `Content-Type` header and a body of exactly
    /// the payload length. Credentials on the destination become a Basic
    /// authorization header on that request only.
    pub struct ReqwestDeliverer {
        client:  Client,
        options: PushOptions,
    }

    impl ReqwestDeliverer {
        /// Create a deliverer with default options.
        pub fn new() -> Result<Self> { Self::with_options(PushOptions::default()) }

        pub fn with_options(options: PushOptions) -> Result<Self> {
            let client = Client::builder()
                .user_agent(options.user_agent.clone())
                .timeout(options.timeout_duration())
                .build()
                .map_err(|e| DeliverError::Client(Box::new(e)))?;
            Ok(Self { client, options })
        }

        pub fn options(&self) -> &PushOptions { &self.options }
    }

    impl Deliverer for ReqwestDeliverer {
        fn push(
            &self,
            destination: &Destination,
            name: &str,
            content_type: &str,
            payload: Payload,
        ) -> Result<()> {
            let url = target_url(destination, name)?;
            let parsed = reqwest::Url::parse(&url).map_err(|e| DeliverError::InvalidUrl {
                url:    url.clone(),
                reason: e.to_string(),
            })?;

            let (reader, len) = payload.into_parts();
            debug!(url = %url, content_type, len, "pushing file");

            let mut request = self
                .client
                .put(parsed)
                .header(CONTENT_TYPE, content_type)
                .body(Body::sized(reader, len));
            if let Some(credentials) = &destination.credentials {
                request = request.basic_auth(&credentials.username, Some(&credentials.password));
            }

            let response = request.send().map_err(|e| DeliverError::Transport {
                url:    url.clone(),
                source: Box::new(e),
            })?;

            let status = response.status().as_u16();
            if is_success(status) {
                return Ok(());
            }
            if self.options.require_success {
                return Err(DeliverError::Status { url, status });
            }
            warn!(url = %url, status, "push returned non-success status; treating as sent");
            Ok(())
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestDeliverer;
