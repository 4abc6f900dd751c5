use crate::data::Destination;
use crate::error::{DeliverError, Result};

/// Build `scheme://host:port/path/name` for a destination.
///
/// Slashes around `path` and in front of `name` are collapsed so the result
/// never contains an empty segment; an empty path puts the file at the root.
///
/// # Examples
///
/// ```
/// use parcel_deliver::{Destination, target_url};
///
/// let destination = Destination::http("example.org", 8080).path("/drop/");
/// assert_eq!(
///     target_url(&destination, "pkg.tar").unwrap(),
///     "http://example.org:8080/drop/pkg.tar"
/// );
/// ```
pub fn target_url(destination: &Destination, name: &str) -> Result<String> {
    let scheme = destination
        .transport
        .scheme()
        .ok_or(DeliverError::UnsupportedTransport(destination.transport))?;

    let host = destination.host.trim();
    if host.is_empty() {
        return Err(DeliverError::InvalidUrl {
            url:    format!("{scheme}://:{}", destination.port),
            reason: "empty host".into(),
        });
    }

    let name = name.trim_start_matches('/');
    if name.is_empty() {
        return Err(DeliverError::InvalidUrl {
            url:    format!("{scheme}://{host}:{}/", destination.port),
            reason: "empty file name".into(),
        });
    }

    let path = destination.path.trim_matches('/');
    let url = if path.is_empty() {
        format!("{scheme}://{host}:{}/{name}", destination.port)
    } else {
        format!("{scheme}://{host}:{}/{path}/{name}", destination.port)
    };
    Ok(url)
}

/// Whether a response status counts as an acknowledged push.
pub fn is_success(status: u16) -> bool { (200..300).contains(&status) }
