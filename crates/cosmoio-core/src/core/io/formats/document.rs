use super::{check_requested_class, create_output, read_source};
use crate::core::io::args::IoArgs;
use crate::core::io::error::IoError;
use crate::core::io::traits::{FormatReader, FormatWriter};
use crate::core::models::class::CosmologyClass;
use crate::core::models::cosmology::Cosmology;
use std::io::Write;

/// Serde-backed document encodings of a single cosmology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Json,
    Toml,
}

impl DocumentKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Json => &["json"],
            Self::Toml => &["toml"],
        }
    }

    pub fn read_help(self) -> &'static str {
        match self {
            Self::Json => {
                "Read a cosmology from a JSON object.\n\n\
                 Arguments:\n  path        file to read\n\
                 Options:\n  cosmology   class the document must describe (or a subclass of it)"
            }
            Self::Toml => {
                "Read a cosmology from a TOML document.\n\n\
                 Arguments:\n  path        file to read\n\
                 Options:\n  cosmology   class the document must describe (or a subclass of it)"
            }
        }
    }

    pub fn write_help(self) -> &'static str {
        match self {
            Self::Json => {
                "Write a cosmology as a JSON object.\n\n\
                 Arguments:\n  path        file to write\n\
                 Options:\n  overwrite   replace an existing file (default false)\n  \
                 pretty      indent the output (default true)"
            }
            Self::Toml => {
                "Write a cosmology as a TOML document.\n\n\
                 Arguments:\n  path        file to write\n\
                 Options:\n  overwrite   replace an existing file (default false)"
            }
        }
    }

    fn known_write_options(self) -> &'static [&'static str] {
        match self {
            Self::Json => &["overwrite", "pretty"],
            Self::Toml => &["overwrite"],
        }
    }
}

/// Reader and writer for one [`DocumentKind`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentFormat {
    kind: DocumentKind,
}

impl DocumentFormat {
    pub fn new(kind: DocumentKind) -> Self {
        Self { kind }
    }

    fn decode(&self, text: &str) -> Result<Cosmology, String> {
        match self.kind {
            DocumentKind::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            DocumentKind::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        }
    }

    fn encode(&self, cosmology: &Cosmology, pretty: bool) -> Result<String, String> {
        match self.kind {
            DocumentKind::Json if pretty => {
                serde_json::to_string_pretty(cosmology).map_err(|e| e.to_string())
            }
            DocumentKind::Json => serde_json::to_string(cosmology).map_err(|e| e.to_string()),
            DocumentKind::Toml => toml::to_string(cosmology).map_err(|e| e.to_string()),
        }
    }
}

impl FormatReader for DocumentFormat {
    fn read(&self, _class: CosmologyClass, args: &IoArgs) -> Result<Cosmology, IoError> {
        let format = self.kind.name();
        args.ensure_known_options(format, &["cosmology"])?;
        let path = args.require_path(format)?;
        let text = read_source(path)?;
        let cosmology = self.decode(&text).map_err(|message| IoError::Decode {
            format: format.to_string(),
            path: path.to_path_buf(),
            message,
        })?;
        check_requested_class(format, args, &cosmology)?;
        Ok(cosmology)
    }
}

impl FormatWriter for DocumentFormat {
    fn write(&self, cosmology: &Cosmology, args: &IoArgs) -> Result<(), IoError> {
        let format = self.kind.name();
        args.ensure_known_options(format, self.kind.known_write_options())?;
        let path = args.require_path(format)?;
        let overwrite = args.bool_option(format, "overwrite", false)?;
        let pretty = match self.kind {
            DocumentKind::Json => args.bool_option(format, "pretty", true)?,
            DocumentKind::Toml => true,
        };

        let text = self
            .encode(cosmology, pretty)
            .map_err(|message| IoError::Encode {
                format: format.to_string(),
                message,
            })?;
        let mut writer = create_output(path, overwrite)?;
        writeln!(writer, "{}", text.trim_end())
            .and_then(|_| writer.flush())
            .map_err(|e| IoError::io(path, e))
    }
}
