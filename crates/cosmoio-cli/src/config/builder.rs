use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{ConvertConfig, ReadConfig, WriteConfig};
use crate::cli::{ConvertArgs, ShowArgs};
use crate::error::{CliError, Result};
use std::path::Path;
use tracing::debug;

fn non_empty(key: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(CliError::Config(format!(
            "`{}` must name a format when set",
            key
        ))),
        other => Ok(other),
    }
}

pub fn build_convert_config(
    args: &ConvertArgs,
    config_path: Option<&Path>,
) -> Result<ConvertConfig> {
    if args.input == args.output {
        return Err(CliError::Argument(format!(
            "input and output must be different files, both are '{}'",
            args.output.display()
        )));
    }

    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(config_path)?;
    let read_file = file_config.read.unwrap_or_default();
    let write_file = file_config.write.unwrap_or_default();

    let read = ReadConfig {
        input: args.input.clone(),
        format: args
            .input_format
            .clone()
            .or(non_empty("read.format", read_file.format)?),
        index: args.index,
    };

    let overwrite = args.overwrite || write_file.overwrite.unwrap_or(defaults.overwrite);
    let pretty = if args.compact {
        false
    } else {
        write_file.pretty.unwrap_or(defaults.pretty)
    };
    let latex_names = if args.plain_names {
        false
    } else {
        write_file.latex_names.unwrap_or(defaults.latex_names)
    };

    let write = WriteConfig {
        output: args.output.clone(),
        format: args
            .output_format
            .clone()
            .or(non_empty("write.format", write_file.format)?),
        overwrite,
        pretty,
        latex_names,
    };

    let config = ConvertConfig { read, write };
    debug!("Resolved convert configuration: {:?}", config);
    Ok(config)
}

pub fn build_show_config(args: &ShowArgs, config_path: Option<&Path>) -> Result<ReadConfig> {
    let file_config = FileConfig::load(config_path)?;
    let read_file = file_config.read.unwrap_or_default();

    let config = ReadConfig {
        input: args.input.clone(),
        format: args
            .input_format
            .clone()
            .or(non_empty("read.format", read_file.format)?),
        index: args.index,
    };
    debug!("Resolved show configuration: {:?}", config);
    Ok(config)
}
