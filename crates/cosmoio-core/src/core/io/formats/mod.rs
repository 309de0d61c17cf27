//! Built-in format plugins.
//!
//! Every format here is file based: the first positional argument names the
//! file, and keyword options are validated by the plugin that receives them.
//!
//! | format        | read | write | identified by |
//! |---------------|------|-------|---------------|
//! | `json`        | yes  | yes   | `.json`       |
//! | `toml`        | yes  | yes   | `.toml`       |
//! | `ascii.csv`   | yes  | yes   | `.csv`        |
//! | `ascii.latex` | no   | yes   | `.tex`        |

pub mod document;
pub mod latex;
pub mod table;

use super::args::{IoArgs, IoMode};
use super::error::IoError;
use super::registry::{RegisterOptions, RegistryBuilder};
use super::traits::FormatIdentifier;
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::Cosmology;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::Path;

pub use document::{DocumentFormat, DocumentKind};
pub use latex::LatexFormat;
pub use table::CsvFormat;

/// Registers every built-in format for the base `Cosmology` class, so each
/// one also serves all subclasses.
///
/// # Arguments
///
/// * `builder` - The registry builder to populate.
///
/// # Errors
///
/// Returns [`IoError::AlreadyRegistered`] if `builder` already holds a
/// handler under one of the built-in names.
pub fn register_builtin(builder: &mut RegistryBuilder) -> Result<(), IoError> {
    let base = CosmologyClass::Cosmology;

    for kind in [DocumentKind::Json, DocumentKind::Toml] {
        let format = DocumentFormat::new(kind);
        builder
            .register_reader(
                kind.name(),
                base,
                format,
                RegisterOptions::described(kind.read_help()),
            )?
            .register_writer(
                kind.name(),
                base,
                format,
                RegisterOptions::described(kind.write_help()),
            )?
            .register_identifier(
                kind.name(),
                base,
                ExtensionIdentifier::new(kind.extensions()),
                false,
            )?;
    }

    builder
        .register_reader(
            table::FORMAT_NAME,
            base,
            CsvFormat,
            RegisterOptions::described(table::READ_HELP),
        )?
        .register_writer(
            table::FORMAT_NAME,
            base,
            CsvFormat,
            RegisterOptions::described(table::WRITE_HELP),
        )?
        .register_identifier(
            table::FORMAT_NAME,
            base,
            ExtensionIdentifier::new(&["csv"]),
            false,
        )?;

    builder
        .register_writer(
            latex::FORMAT_NAME,
            base,
            LatexFormat,
            RegisterOptions::described(latex::WRITE_HELP),
        )?
        .register_identifier(
            latex::FORMAT_NAME,
            base,
            ExtensionIdentifier::new(&["tex"]),
            false,
        )?;

    Ok(())
}

/// Identifies a format by the extension of the target path, ignoring case.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionIdentifier {
    extensions: &'static [&'static str],
}

impl ExtensionIdentifier {
    /// `extensions` are given without the leading dot.
    pub fn new(extensions: &'static [&'static str]) -> Self {
        Self { extensions }
    }
}

impl FormatIdentifier for ExtensionIdentifier {
    fn identify(&self, _mode: IoMode, args: &IoArgs) -> bool {
        args.target_path()
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String, IoError> {
    fs::read_to_string(path).map_err(|e| IoError::io(path, e))
}

/// Opens `path` for writing, refusing to clobber an existing file unless
/// `overwrite` is set.
pub(crate) fn create_output(path: &Path, overwrite: bool) -> Result<BufWriter<File>, IoError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let file = options.open(path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => IoError::FileExists {
            path: path.to_path_buf(),
        },
        _ => IoError::io(path, e),
    })?;
    Ok(BufWriter::new(file))
}

/// Applies the `cosmology` read option: the decoded instance must belong to
/// the named class or one of its subclasses.
pub(crate) fn check_requested_class(
    format: &str,
    args: &IoArgs,
    cosmology: &Cosmology,
) -> Result<(), IoError> {
    let Some(name) = args.str_option(format, "cosmology")? else {
        return Ok(());
    };
    let requested: CosmologyClass = name.parse().map_err(|e| IoError::InvalidOption {
        format: format.to_string(),
        option: "cosmology".to_string(),
        reason: format!("{}", e),
    })?;
    if cosmology.class().is_subclass_of(requested) {
        Ok(())
    } else {
        Err(IoError::UnexpectedClass {
            expected: requested,
            found: cosmology.class(),
        })
    }
}
