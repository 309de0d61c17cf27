use crate::cli::ShowArgs;
use crate::config;
use crate::error::Result;
use cosmoio::core::io::connect::make_reader;
use cosmoio::core::io::registry::UnifiedIoRegistry;
use cosmoio::core::models::class::CosmologyClass;
use cosmoio::core::models::cosmology::Cosmology;
use std::fmt::Write;
use std::path::Path;
use tracing::info;

pub fn run(args: ShowArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::build_show_config(&args, config_path)?;
    let registry = UnifiedIoRegistry::with_builtin_formats()?;

    info!("Loading cosmology from {:?}", &config.input);
    let cosmology = make_reader(&registry, CosmologyClass::Cosmology)
        .into_result()?
        .call(config.to_io_args())?;

    print!("{}", render_summary(&cosmology));
    Ok(())
}

pub fn render_summary(cosmology: &Cosmology) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Class: {}", cosmology.class());
    if let Some(name) = cosmology.name() {
        let _ = writeln!(out, "Name:  {}", name);
    }

    let _ = writeln!(out, "Parameters:");
    for (param, value) in cosmology.parameters().present() {
        let _ = writeln!(out, "  {:<8} = {}", param.name(), value);
    }

    let _ = writeln!(out, "Derived:");
    let derived = [
        ("h", cosmology.h()),
        ("Ogamma0", cosmology.ogamma0()),
        ("Onu0", cosmology.onu0()),
        ("Ode0", cosmology.ode0()),
        ("Ok0", cosmology.ok0()),
    ];
    for (label, value) in derived {
        let _ = writeln!(out, "  {:<8} = {:.6e}", label, value);
    }

    if !cosmology.meta().is_empty() {
        let _ = writeln!(out, "Meta:");
        for (key, value) in cosmology.meta() {
            let _ = writeln!(out, "  {} = {}", key, value);
        }
    }
    out
}
