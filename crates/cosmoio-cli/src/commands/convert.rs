use crate::cli::ConvertArgs;
use crate::config;
use crate::error::Result;
use cosmoio::core::io::registry::UnifiedIoRegistry;
use cosmoio::workflows;
use std::path::Path;
use tracing::info;

pub fn run(args: ConvertArgs, config_path: Option<&Path>) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = config::build_convert_config(&args, config_path)?;

    let registry = UnifiedIoRegistry::with_builtin_formats()?;
    let input = config.read.to_io_args();
    let output = config.write.to_io_args(&registry)?;

    info!(
        "Converting {:?} to {:?}.",
        &config.read.input, &config.write.output
    );
    let cosmology = workflows::convert::run(&registry, input, output)?;

    println!(
        "Wrote {} cosmology{} to {}",
        cosmology.class(),
        cosmology
            .name()
            .map(|name| format!(" '{}'", name))
            .unwrap_or_default(),
        config.write.output.display()
    );
    Ok(())
}
