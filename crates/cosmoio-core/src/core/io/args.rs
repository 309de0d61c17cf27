use super::error::IoError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IoMode {
    Read,
    Write,
}

impl IoMode {
    /// The handler kind registered for this mode ("reader" or "writer").
    pub fn handler_noun(self) -> &'static str {
        match self {
            Self::Read => "reader",
            Self::Write => "writer",
        }
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// A single argument value passed through to a format plugin.
#[derive(Debug, Clone, PartialEq)]
pub enum IoValue {
    Str(String),
    Path(PathBuf),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl IoValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Path(_) => "path",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for IoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for IoValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for IoValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<PathBuf> for IoValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for IoValue {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<i64> for IoValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for IoValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for IoValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for IoValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Call arguments for a read or write dispatch.
///
/// Positional values and keyword options are opaque to the registry and the
/// adapters; only the selected format plugin interprets them. `format` is the
/// one keyword the registry itself consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IoArgs {
    positional: Vec<IoValue>,
    format: Option<String>,
    options: BTreeMap<String, IoValue>,
}

impl IoArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for arguments whose only positional value is a file path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::new().arg(path.into())
    }

    pub fn arg(mut self, value: impl Into<IoValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<IoValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[IoValue] {
        &self.positional
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn options(&self) -> &BTreeMap<String, IoValue> {
        &self.options
    }

    /// The first positional argument interpreted as a filesystem path.
    pub fn target_path(&self) -> Option<&Path> {
        match self.positional.first()? {
            IoValue::Path(p) => Some(p.as_path()),
            IoValue::Str(s) => Some(Path::new(s.as_str())),
            _ => None,
        }
    }

    /// The target path, required by every file-based format.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingArgument`] naming `format` if no path was passed.
    pub fn require_path(&self, format: &str) -> Result<&Path, IoError> {
        self.target_path().ok_or_else(|| IoError::MissingArgument {
            format: format.to_string(),
            argument: "path",
        })
    }

    /// Rejects keyword options outside `known`.
    ///
    /// # Arguments
    ///
    /// * `format` - The calling format, used in the error.
    /// * `known` - Every option name the format accepts.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidOption`] for the first unknown option.
    pub fn ensure_known_options(&self, format: &str, known: &[&str]) -> Result<(), IoError> {
        match self.options.keys().find(|k| !known.contains(&k.as_str())) {
            Some(unknown) => Err(IoError::InvalidOption {
                format: format.to_string(),
                option: unknown.clone(),
                reason: if known.is_empty() {
                    "this format takes no options".to_string()
                } else {
                    format!("unexpected keyword; expected one of: {}", known.join(", "))
                },
            }),
            None => Ok(()),
        }
    }

    /// Reads the boolean option `name`, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidOption`] if the value is not a boolean.
    pub fn bool_option(&self, format: &str, name: &str, default: bool) -> Result<bool, IoError> {
        match self.options.get(name) {
            None => Ok(default),
            Some(IoValue::Bool(b)) => Ok(*b),
            Some(other) => Err(wrong_type(format, name, "a boolean", other)),
        }
    }

    /// Reads the non-negative integer option `name`.
    pub fn index_option(&self, format: &str, name: &str) -> Result<Option<usize>, IoError> {
        match self.options.get(name) {
            None => Ok(None),
            Some(IoValue::Int(i)) => usize::try_from(*i).map(Some).map_err(|_| {
                IoError::InvalidOption {
                    format: format.to_string(),
                    option: name.to_string(),
                    reason: format!("must be non-negative, got {}", i),
                }
            }),
            Some(other) => Err(wrong_type(format, name, "an integer", other)),
        }
    }

    pub fn str_option(&self, format: &str, name: &str) -> Result<Option<&str>, IoError> {
        match self.options.get(name) {
            None => Ok(None),
            Some(IoValue::Str(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_type(format, name, "a string", other)),
        }
    }
}

fn wrong_type(format: &str, name: &str, expected: &str, found: &IoValue) -> IoError {
    IoError::InvalidOption {
        format: format.to_string(),
        option: name.to_string(),
        reason: format!("expected {}, got {} {}", expected, found.type_name(), found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_accepts_strings_and_paths() {
        assert_eq!(
            IoArgs::new().arg("a.json").target_path(),
            Some(Path::new("a.json"))
        );
        assert_eq!(
            IoArgs::path("/tmp/b.toml").target_path(),
            Some(Path::new("/tmp/b.toml"))
        );
        assert_eq!(IoArgs::new().arg(3i64).target_path(), None);
        assert_eq!(IoArgs::new().target_path(), None);
    }

    #[test]
    fn require_path_reports_missing_argument() {
        let err = IoArgs::new().require_path("json").unwrap_err();
        assert!(matches!(
            err,
            IoError::MissingArgument {
                argument: "path",
                ..
            }
        ));
    }

    #[test]
    fn format_is_kept_apart_from_options() {
        let args = IoArgs::path("x.csv")
            .with_format("ascii.csv")
            .option("index", 1usize);
        assert_eq!(args.format(), Some("ascii.csv"));
        assert_eq!(args.options().len(), 1);
        assert!(args.ensure_known_options("ascii.csv", &["index"]).is_ok());
    }

    #[test]
    fn ensure_known_options_names_the_unexpected_keyword() {
        let args = IoArgs::path("x.json").option("indent", 4i64);
        match args.ensure_known_options("json", &["overwrite"]) {
            Err(IoError::InvalidOption { option, .. }) => assert_eq!(option, "indent"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn typed_option_getters_enforce_types() {
        let args = IoArgs::new()
            .option("overwrite", "yes")
            .option("index", -1i64)
            .option("cosmology", "LambdaCDM");
        assert!(args.bool_option("json", "overwrite", false).is_err());
        assert!(args.index_option("ascii.csv", "index").is_err());
        assert_eq!(
            args.str_option("json", "cosmology").unwrap(),
            Some("LambdaCDM")
        );
        assert!(args.bool_option("json", "pretty", true).unwrap());
        assert_eq!(args.index_option("ascii.csv", "row").unwrap(), None);
    }
}
