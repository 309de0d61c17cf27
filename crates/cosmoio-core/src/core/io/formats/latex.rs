use super::create_output;
use crate::core::io::args::IoArgs;
use crate::core::io::error::IoError;
use crate::core::io::traits::FormatWriter;
use crate::core::models::class::Param;
use crate::core::models::cosmology::Cosmology;
use std::io::Write;

pub const FORMAT_NAME: &str = "ascii.latex";

pub const WRITE_HELP: &str = "Write a cosmology as a LaTeX `table`/`tabular` environment.\n\n\
    This format is write-only.\n\n\
    Arguments:\n  path         file to write\n\
    Options:\n  overwrite    replace an existing file (default false)\n  \
    latex_names  typeset parameter names, e.g. $H_0$ (default true)";

#[derive(Debug, Clone, Copy, Default)]
pub struct LatexFormat;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

fn render(cosmology: &Cosmology, latex_names: bool) -> String {
    let class = cosmology.class();
    let columns: Vec<Param> = Param::ALL
        .into_iter()
        .filter(|p| class.accepts(*p))
        .collect();

    let mut header = vec!["cosmology".to_string(), "name".to_string()];
    header.extend(columns.iter().map(|p| {
        if latex_names {
            p.latex().to_string()
        } else {
            escape(p.name())
        }
    }));

    let mut row = vec![
        escape(class.name()),
        escape(cosmology.name().unwrap_or_default()),
    ];
    row.extend(columns.iter().map(|p| {
        cosmology
            .parameters()
            .get(*p)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }));

    let mut out = String::new();
    out.push_str("\\begin{table}\n");
    out.push_str(&format!("\\begin{{tabular}}{{{}}}\n", "c".repeat(header.len())));
    out.push_str(&format!("{} \\\\\n", header.join(" & ")));
    out.push_str("\\hline\n");
    out.push_str(&format!("{} \\\\\n", row.join(" & ")));
    out.push_str("\\end{tabular}\n");
    out.push_str("\\end{table}\n");
    out
}

impl FormatWriter for LatexFormat {
    fn write(&self, cosmology: &Cosmology, args: &IoArgs) -> Result<(), IoError> {
        args.ensure_known_options(FORMAT_NAME, &["overwrite", "latex_names"])?;
        let path = args.require_path(FORMAT_NAME)?;
        let overwrite = args.bool_option(FORMAT_NAME, "overwrite", false)?;
        let latex_names = args.bool_option(FORMAT_NAME, "latex_names", true)?;

        let mut writer = create_output(path, overwrite)?;
        writer
            .write_all(render(cosmology, latex_names).as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| IoError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::class::CosmologyClass;
    use tempfile::tempdir;

    fn flat() -> Cosmology {
        Cosmology::builder(CosmologyClass::FlatLambdaCdm)
            .name("Planck_18")
            .h0(67.66)
            .om0(0.30966)
            .build()
            .unwrap()
    }

    #[test]
    fn render_uses_typeset_names_by_default() {
        let text = render(&flat(), true);
        assert!(text.starts_with("\\begin{table}\n\\begin{tabular}{cccccccc}\n"));
        assert!(text.contains("cosmology & name & $H_0$ & $\\Omega_{m,0}$"));
        assert!(text.contains("FlatLambdaCDM & Planck\\_18 & 67.66 & 0.30966"));
        assert!(text.ends_with("\\end{tabular}\n\\end{table}\n"));
    }

    #[test]
    fn render_escapes_plain_names() {
        let text = render(&flat(), false);
        assert!(text.contains("& m\\_nu &"));
        assert!(!text.contains("$H_0$"));
    }

    #[test]
    fn escape_handles_special_characters() {
        assert_eq!(escape("a&b%c"), "a\\&b\\%c");
        assert_eq!(escape("x^2~y"), "x\\textasciicircum{}2\\textasciitilde{}y");
        assert_eq!(escape("back\\slash"), "back\\textbackslash{}slash");
    }

    #[test]
    fn write_creates_file_and_honours_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tex");
        LatexFormat.write(&flat(), &IoArgs::path(&path)).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("\\hline"));
        assert!(matches!(
            LatexFormat.write(&flat(), &IoArgs::path(&path)),
            Err(IoError::FileExists { .. })
        ));
    }
}
