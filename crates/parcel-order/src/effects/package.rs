use std::io;

use parcel_archive::{Entry, SpillReader, SpillSource, gzip, tar, zip};
use parcel_deliver::{Deliverer, Destination, Payload};
use tracing::debug;

use crate::config::FulfillmentOptions;
use crate::data::StagedResource;
use crate::error::PackageError;
use crate::plan::{Artifact, ArtifactType, Outer, PackagePlan, Recipe};

fn member(resources: &[StagedResource], index: usize) -> io::Result<&StagedResource> {
    resources.get(index).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("artifact member {index} out of range for {} resources", resources.len()),
        )
    })
}

fn entries(
    resources: &[StagedResource],
    members: &[usize],
) -> io::Result<Vec<Entry<SpillReader>>> {
    members
        .iter()
        .map(|&index| {
            let resource = member(resources, index)?;
            Ok(Entry::new(
                resource.name.clone(),
                resource.content.open()?,
                resource.len(),
            ))
        })
        .collect()
}

fn build_tar(
    resources: &[StagedResource],
    members: &[usize],
    options: &FulfillmentOptions,
) -> Result<SpillSource, PackageError> {
    let buffer = tar(
        options.spill_buffer(),
        entries(resources, members)?,
        options.tar_options(),
    )?;
    Ok(buffer.finish()?)
}

/// Build the bytes of one planned artifact.
///
/// Passthrough artifacts reuse the staged content; everything else is written
/// into a fresh spill buffer.
pub fn build_artifact(
    plan: &PackagePlan,
    artifact: &Artifact,
    resources: &[StagedResource],
    options: &FulfillmentOptions,
) -> Result<SpillSource, PackageError> {
    let members = artifact.members.as_slice();

    let source = match plan.recipe {
        Recipe::Passthrough => match members {
            [index] => member(resources, *index)?.content.clone(),
            _ => {
                return Err(PackageError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "passthrough artifact must hold exactly one resource",
                )));
            }
        }
        Recipe::EachZip | Recipe::Zip => {
            let (buffer, written) = zip(options.spill_buffer(), entries(resources, members)?)?;
            if written.len() < members.len() {
                debug!(
                    file = %artifact.file_name,
                    kept = written.len(),
                    dropped = members.len() - written.len(),
                    "duplicate entry names suppressed"
                );
            }
            buffer.finish()?
        }
        Recipe::EachGzip => {
            let mut readers = entries(resources, members)?;
            let entry = readers.pop().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "gzip artifact has no resource")
            })?;
            gzip(options.spill_buffer(), entry.reader)?.finish()?
        }
        Recipe::Tar => build_tar(resources, members, options)?,
        Recipe::TarThen(outer) => {
            let inner = build_tar(resources, members, options)?;
            let reader = inner.open()?;
            match outer {
                Outer::Zip => {
                    let entry = Entry::new(plan.nested_tar_name(), reader, inner.len());
                    let (buffer, _) = zip(options.spill_buffer(), [entry])?;
                    buffer.finish()?
                }
                Outer::Gzip => gzip(options.spill_buffer(), reader)?.finish()?,
            }
        }
    };

    debug!(file = %artifact.file_name, len = source.len(), recipe = ?plan.recipe, "built artifact");
    Ok(source)
}

fn content_type<'a>(
    plan: &PackagePlan,
    artifact: &Artifact,
    resources: &'a [StagedResource],
) -> &'a str {
    match artifact.content_type {
        ArtifactType::Fixed(content_type) => content_type,
        ArtifactType::Original => artifact
            .members
            .first()
            .and_then(|&index| resources.get(index))
            .and_then(|resource| resource.content_type.as_deref())
            .unwrap_or_else(|| plan.format.content_type()),
    }
}

/// Build and push every artifact of `plan` to one destination.
///
/// Stops at the first failure. Returns the pushed file names in plan order.
pub fn deliver_plan<D: Deliverer>(
    deliverer: &D,
    destination: &Destination,
    plan: &PackagePlan,
    resources: &[StagedResource],
    options: &FulfillmentOptions,
) -> Result<Vec<String>, PackageError> {
    let mut sent = Vec::with_capacity(plan.artifacts.len());

    for artifact in &plan.artifacts {
        let source = build_artifact(plan, artifact, resources, options)?;
        let payload = Payload::new(source.open()?, source.len());
        deliverer.push(
            destination,
            &artifact.file_name,
            content_type(plan, artifact, resources),
            payload,
        )?;
        sent.push(artifact.file_name.clone());
    }

    Ok(sent)
}
