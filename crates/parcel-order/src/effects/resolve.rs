use std::io;

use tracing::{debug, warn};

use crate::config::FulfillmentOptions;
use crate::data::{ProductRef, ResourceContainer, StagedResource};
use crate::error::ResolveError;

/// Turns a product reference into an open byte stream.
///
/// `Context` carries whatever delegated identity the retrieval runs under;
/// failures to act within it are reported as [`ResolveError::Execution`].
pub trait ResourceResolver {
    type Context;

    fn resolve(
        &self,
        product: &ProductRef,
        context: &Self::Context,
    ) -> Result<ResourceContainer, ResolveError>;
}

impl<T: ResourceResolver + ?Sized> ResourceResolver for &T {
    type Context = T::Context;

    fn resolve(
        &self,
        product: &ProductRef,
        context: &Self::Context,
    ) -> Result<ResourceContainer, ResolveError> {
        (**self).resolve(product, context)
    }
}

impl<T: ResourceResolver + ?Sized> ResourceResolver for Box<T> {
    type Context = T::Context;

    fn resolve(
        &self,
        product: &ProductRef,
        context: &Self::Context,
    ) -> Result<ResourceContainer, ResolveError> {
        (**self).resolve(product, context)
    }
}

/// Drain a resolved stream into a spill buffer.
///
/// The container's reader is dropped before returning, on success or error.
/// The staged length is what was actually read; a differing declared size is
/// only logged.
pub fn stage(container: ResourceContainer, options: &FulfillmentOptions) -> io::Result<StagedResource> {
    let ResourceContainer {
        mut reader,
        name,
        size,
        content_type,
    } = container;

    let mut buffer = options.staging_buffer();
    let copied = io::copy(&mut reader, &mut buffer);
    drop(reader);
    let copied = copied?;

    if let Some(declared) = size {
        if declared != copied {
            warn!(resource = %name, declared, actual = copied, "resource size differs from declared");
        }
    }

    let content = buffer.finish()?;
    debug!(resource = %name, len = content.len(), spilled = content.is_spilled(), "staged resource");
    Ok(StagedResource {
        name,
        content_type,
        content,
    })
}
