use crate::cli::FormatsArgs;
use crate::error::Result;
use cosmoio::core::io::args::IoMode;
use cosmoio::core::io::connect::make_reader;
use cosmoio::core::io::registry::UnifiedIoRegistry;
use cosmoio::core::models::class::CosmologyClass;
use tracing::debug;

pub fn run(args: FormatsArgs) -> Result<()> {
    let registry = UnifiedIoRegistry::with_builtin_formats()?;
    let modes = match args.mode {
        Some(mode) => vec![IoMode::from(mode)],
        None => vec![IoMode::Read, IoMode::Write],
    };
    print!("{}", render(&registry, &modes, args.format.as_deref())?);
    Ok(())
}

fn help_for(registry: &UnifiedIoRegistry, mode: IoMode, format: Option<&str>) -> Result<String> {
    let text = match mode {
        IoMode::Read => make_reader(registry, CosmologyClass::Cosmology)
            .into_result()?
            .help(format)?,
        // The writer adapter is bound to an instance; without one, ask the registry.
        IoMode::Write => registry.help(CosmologyClass::Cosmology, IoMode::Write, format)?,
    };
    Ok(text)
}

/// Joins the help of every requested mode. A format known to only some of
/// the modes is documented for those; unknown everywhere is an error.
pub fn render(
    registry: &UnifiedIoRegistry,
    modes: &[IoMode],
    format: Option<&str>,
) -> Result<String> {
    let mut sections = Vec::new();
    let mut last_error = None;
    for &mode in modes {
        match help_for(registry, mode, format) {
            Ok(text) => sections.push(text),
            Err(e) if format.is_some() && modes.len() > 1 => {
                debug!("No {} documentation for {:?}: {}", mode, format, e);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    match (sections.is_empty(), last_error) {
        (true, Some(e)) => Err(e),
        _ => Ok(sections.join("\n")),
    }
}
