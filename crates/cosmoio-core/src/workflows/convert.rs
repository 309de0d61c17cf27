use crate::core::io::args::IoArgs;
use crate::core::io::connect::{make_reader, make_writer};
use crate::core::io::error::IoError;
use crate::core::io::registry::UnifiedIoRegistry;
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::Cosmology;
use tracing::{info, instrument};

/// Reads a cosmology with `input` and writes it with `output`, returning it.
///
/// The read goes through the base-class read adapter and the write through
/// the adapter bound to the cosmology just read, so both calls see exactly
/// the arguments given here.
///
/// # Arguments
///
/// * `registry` - The registry both adapters delegate to.
/// * `input` - Read arguments; typically a path and an optional `format`.
/// * `output` - Write arguments; typically a path, an optional `format` and `overwrite`.
///
/// # Return
///
/// Returns the cosmology that was read and written.
///
/// # Errors
///
/// Returns the first error of the read or the write. Nothing is written if
/// the read fails.
#[instrument(skip_all, name = "convert_workflow")]
pub fn run(
    registry: &UnifiedIoRegistry,
    input: IoArgs,
    output: IoArgs,
) -> Result<Cosmology, IoError> {
    let cosmology = make_reader(registry, CosmologyClass::Cosmology)
        .into_result()?
        .call(input)?;
    info!(
        class = %cosmology.class(),
        name = cosmology.name().unwrap_or("<unnamed>"),
        "Read cosmology."
    );

    make_writer(registry, &cosmology).call(output)?;
    info!("Wrote cosmology.");
    Ok(cosmology)
}
