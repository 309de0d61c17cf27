use super::{check_requested_class, create_output};
use crate::core::io::args::IoArgs;
use crate::core::io::error::IoError;
use crate::core::io::traits::{FormatReader, FormatWriter};
use crate::core::models::class::{CosmologyClass, Param};
use crate::core::models::cosmology::{Cosmology, ModelError};
use crate::core::models::params::ParamValue;
use std::io::Write;
use std::path::Path;

pub const FORMAT_NAME: &str = "ascii.csv";

pub const READ_HELP: &str = "Read a cosmology from one row of a CSV table.\n\n\
    The header holds `cosmology`, an optional `name`, and one column per parameter.\n\
    Empty cells leave the parameter unset; `m_nu` cells are space separated.\n\n\
    Arguments:\n  path        file to read\n\
    Options:\n  index       row to read when the table has several (0-based)\n  \
    cosmology   class the row must describe (or a subclass of it)";

pub const WRITE_HELP: &str = "Write a cosmology as a single-row CSV table.\n\n\
    Columns are the parameters accepted by the instance's class, in canonical order.\n\n\
    Arguments:\n  path        file to write\n\
    Options:\n  overwrite   replace an existing file (default false)";

const CLASS_COLUMN: &str = "cosmology";
const NAME_COLUMN: &str = "name";

/// The `ascii.csv` reader and writer: one cosmology per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormat;

fn decode_error(path: &Path, message: impl Into<String>) -> IoError {
    IoError::Decode {
        format: FORMAT_NAME.to_string(),
        path: path.to_path_buf(),
        message: message.into(),
    }
}

impl FormatReader for CsvFormat {
    fn read(&self, _class: CosmologyClass, args: &IoArgs) -> Result<Cosmology, IoError> {
        args.ensure_known_options(FORMAT_NAME, &["index", "cosmology"])?;
        let path = args.require_path(FORMAT_NAME)?;
        let index = args.index_option(FORMAT_NAME, "index")?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(source) => IoError::io(path, source),
                other => decode_error(path, format!("{:?}", other)),
            })?;
        let headers = reader
            .headers()
            .map_err(|e| decode_error(path, e.to_string()))?
            .clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| decode_error(path, e.to_string()))?;

        let row = match (rows.len(), index) {
            (0, _) => return Err(decode_error(path, "table has no rows")),
            (1, None) => &rows[0],
            (n, None) => {
                return Err(IoError::InvalidOption {
                    format: FORMAT_NAME.to_string(),
                    option: "index".to_string(),
                    reason: format!("table has {} rows; select one with `index`", n),
                });
            }
            (n, Some(i)) => rows.get(i).ok_or_else(|| IoError::InvalidOption {
                format: FORMAT_NAME.to_string(),
                option: "index".to_string(),
                reason: format!("row {} is out of range for a table of {} rows", i, n),
            })?,
        };

        let mut class = None;
        let mut name = None;
        let mut values = Vec::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            match header {
                CLASS_COLUMN => {
                    let parsed: CosmologyClass = cell
                        .parse()
                        .map_err(|_| ModelError::UnknownClass(cell.to_string()))?;
                    class = Some(parsed);
                }
                NAME_COLUMN if !cell.is_empty() => name = Some(cell.to_string()),
                NAME_COLUMN => {}
                _ => {
                    let param: Param = header
                        .parse()
                        .map_err(|_| decode_error(path, format!("unknown column '{}'", header)))?;
                    if !cell.is_empty() {
                        let value = ParamValue::parse(param, cell).map_err(ModelError::from)?;
                        values.push((param, value));
                    }
                }
            }
        }

        let class = class
            .ok_or_else(|| decode_error(path, format!("missing '{}' column", CLASS_COLUMN)))?;
        let mut builder = Cosmology::builder(class);
        if let Some(name) = name {
            builder = builder.name(name);
        }
        for (param, value) in values {
            builder = builder.param(param, value)?;
        }
        let cosmology = builder.build()?;
        check_requested_class(FORMAT_NAME, args, &cosmology)?;
        Ok(cosmology)
    }
}

impl FormatWriter for CsvFormat {
    fn write(&self, cosmology: &Cosmology, args: &IoArgs) -> Result<(), IoError> {
        args.ensure_known_options(FORMAT_NAME, &["overwrite"])?;
        let path = args.require_path(FORMAT_NAME)?;
        let overwrite = args.bool_option(FORMAT_NAME, "overwrite", false)?;

        let class = cosmology.class();
        let columns: Vec<Param> = Param::ALL
            .into_iter()
            .filter(|p| class.accepts(*p))
            .collect();

        let mut header = vec![CLASS_COLUMN.to_string(), NAME_COLUMN.to_string()];
        header.extend(columns.iter().map(|p| p.name().to_string()));
        let mut row = vec![
            class.name().to_string(),
            cosmology.name().unwrap_or_default().to_string(),
        ];
        row.extend(columns.iter().map(|p| {
            cosmology
                .parameters()
                .get(*p)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }));

        let encode = |message: String| IoError::Encode {
            format: FORMAT_NAME.to_string(),
            message,
        };
        let mut encoder = csv::Writer::from_writer(Vec::new());
        encoder
            .write_record(&header)
            .and_then(|_| encoder.write_record(&row))
            .map_err(|e| encode(e.to_string()))?;
        let bytes = encoder
            .into_inner()
            .map_err(|e| encode(e.error().to_string()))?;

        let mut output = create_output(path, overwrite)?;
        output
            .write_all(&bytes)
            .and_then(|_| output.flush())
            .map_err(|e| IoError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lcdm() -> Cosmology {
        Cosmology::builder(CosmologyClass::LambdaCdm)
            .name("curved")
            .h0(70.0)
            .om0(0.25)
            .ode0(0.5)
            .m_nu(vec![0.0, 0.5])
            .build()
            .unwrap()
    }

    #[test]
    fn write_emits_header_and_single_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.csv");
        CsvFormat.write(&lcdm(), &IoArgs::path(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("cosmology,name,H0,Om0,Ode0,Tcmb0,Neff,m_nu,Ob0")
        );
        assert_eq!(lines.next(), Some("LambdaCDM,curved,70,0.25,0.5,0,3.04,0 0.5,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn write_then_read_reproduces_the_instance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.csv");
        CsvFormat.write(&lcdm(), &IoArgs::path(&path)).unwrap();
        let back = CsvFormat
            .read(CosmologyClass::Cosmology, &IoArgs::path(&path))
            .unwrap();
        assert_eq!(back, lcdm());
    }

    #[test]
    fn multi_row_tables_need_an_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("many.csv");
        std::fs::write(
            &path,
            "cosmology, name, H0, Om0\nFlatLambdaCDM, a, 70, 0.3\nFlatLambdaCDM, b, 68, 0.31\n",
        )
        .unwrap();

        let err = CsvFormat
            .read(CosmologyClass::Cosmology, &IoArgs::path(&path))
            .unwrap_err();
        assert!(matches!(err, IoError::InvalidOption { ref option, .. } if option == "index"));

        let second = CsvFormat
            .read(
                CosmologyClass::Cosmology,
                &IoArgs::path(&path).option("index", 1usize),
            )
            .unwrap();
        assert_eq!(second.name(), Some("b"));
        assert_eq!(second.h0(), 68.0);

        let out_of_range = CsvFormat.read(
            CosmologyClass::Cosmology,
            &IoArgs::path(&path).option("index", 2usize),
        );
        assert!(matches!(out_of_range, Err(IoError::InvalidOption { .. })));
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "cosmology,H0,Om0,sigma8\nFlatLambdaCDM,70,0.3,0.8\n").unwrap();
        let err = CsvFormat
            .read(CosmologyClass::Cosmology, &IoArgs::path(&path))
            .unwrap_err();
        assert!(err.to_string().contains("sigma8"));
    }

    #[test]
    fn blank_name_and_default_masses_survive_a_write_read_cycle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        let cosmo = Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .name(" ")
            .h0(70.0)
            .om0(0.3)
            .build()
            .unwrap();
        assert_eq!(cosmo.name(), None);
        assert_eq!(cosmo.parameters().m_nu, Some(vec![0.0]));

        CsvFormat.write(&cosmo, &IoArgs::path(&path)).unwrap();
        let back = CsvFormat
            .read(CosmologyClass::Cosmology, &IoArgs::path(&path))
            .unwrap();
        assert_eq!(back, cosmo);
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "cosmology,name,H0,Om0\n").unwrap();
        match CsvFormat.read(CosmologyClass::Cosmology, &IoArgs::path(&path)) {
            Err(IoError::Decode { message, .. }) => assert_eq!(message, "table has no rows"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_class_column_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noclass.csv");
        std::fs::write(&path, "H0,Om0\n70,0.3\n").unwrap();
        assert!(matches!(
            CsvFormat.read(CosmologyClass::Cosmology, &IoArgs::path(&path)),
            Err(IoError::Decode { .. })
        ));
    }

    #[test]
    fn invalid_cells_surface_as_model_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cells.csv");
        std::fs::write(&path, "cosmology,H0,Om0\nFlatLambdaCDM,fast,0.3\n").unwrap();
        assert!(matches!(
            CsvFormat.read(CosmologyClass::Cosmology, &IoArgs::path(&path)),
            Err(IoError::Model(ModelError::Value(_)))
        ));
    }
}
