use cosmoio::core::io::args::{IoArgs, IoMode};
use cosmoio::core::io::error::IoError;
use cosmoio::core::io::registry::UnifiedIoRegistry;
use cosmoio::core::models::class::CosmologyClass;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ReadConfig {
    pub input: PathBuf,
    pub format: Option<String>,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteConfig {
    pub output: PathBuf,
    pub format: Option<String>,
    pub overwrite: bool,
    pub pretty: bool,
    pub latex_names: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    pub read: ReadConfig,
    pub write: WriteConfig,
}

impl ReadConfig {
    pub fn to_io_args(&self) -> IoArgs {
        let mut args = IoArgs::path(&self.input);
        if let Some(format) = &self.format {
            args = args.with_format(format.as_str());
        }
        if let Some(index) = self.index {
            args = args.option("index", index);
        }
        args
    }
}

impl WriteConfig {
    /// Builds writer arguments, attaching only the options the target format understands.
    pub fn to_io_args(&self, registry: &UnifiedIoRegistry) -> Result<IoArgs, IoError> {
        let mut args = IoArgs::path(&self.output);
        if let Some(format) = &self.format {
            args = args.with_format(format.as_str());
        }
        let format = registry.resolve_format(IoMode::Write, CosmologyClass::Cosmology, &args)?;

        args = args.option("overwrite", self.overwrite);
        match format.as_str() {
            "json" => args = args.option("pretty", self.pretty),
            "ascii.latex" => args = args.option("latex_names", self.latex_names),
            _ => {}
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmoio::core::io::args::IoValue;

    fn write_config(output: &str) -> WriteConfig {
        WriteConfig {
            output: PathBuf::from(output),
            format: None,
            overwrite: true,
            pretty: false,
            latex_names: false,
        }
    }

    #[test]
    fn read_args_carry_format_and_index() {
        let config = ReadConfig {
            input: PathBuf::from("table.dat"),
            format: Some("ascii.csv".to_string()),
            index: Some(3),
        };
        let args = config.to_io_args();
        assert_eq!(args.format(), Some("ascii.csv"));
        assert_eq!(args.options().get("index"), Some(&IoValue::Int(3)));
        assert_eq!(args.target_path(), Some(PathBuf::from("table.dat").as_path()));
    }

    #[test]
    fn write_args_only_carry_options_of_the_resolved_format() {
        let registry = UnifiedIoRegistry::with_builtin_formats().unwrap();

        let json = write_config("out.json").to_io_args(&registry).unwrap();
        assert_eq!(json.options().get("pretty"), Some(&IoValue::Bool(false)));
        assert!(!json.options().contains_key("latex_names"));

        let latex = write_config("out.tex").to_io_args(&registry).unwrap();
        assert_eq!(latex.options().get("latex_names"), Some(&IoValue::Bool(false)));
        assert!(!latex.options().contains_key("pretty"));

        let csv = write_config("out.csv").to_io_args(&registry).unwrap();
        assert_eq!(csv.options().len(), 1);
        assert_eq!(csv.options().get("overwrite"), Some(&IoValue::Bool(true)));
    }

    #[test]
    fn explicit_write_format_overrides_the_extension() {
        let registry = UnifiedIoRegistry::with_builtin_formats().unwrap();
        let mut config = write_config("out.txt");
        config.format = Some("json".to_string());
        let args = config.to_io_args(&registry).unwrap();
        assert_eq!(args.format(), Some("json"));
        assert!(args.options().contains_key("pretty"));
    }

    #[test]
    fn unidentifiable_output_is_reported() {
        let registry = UnifiedIoRegistry::with_builtin_formats().unwrap();
        assert!(matches!(
            write_config("out.txt").to_io_args(&registry),
            Err(IoError::FormatNotIdentified { .. })
        ));
    }
}
