use std::io::{self, Write};

use anyhow::Error;

use mol_readout::config::{Error as ConfigError, SchemaError, ViolationKind};
use mol_readout::{Format, ReadoutError};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = HintCollector::collect(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

#[derive(Default)]
struct HintCollector {
    hints: Vec<String>,
    typed: bool,
}

impl HintCollector {
    fn collect(err: &Error) -> Vec<String> {
        let mut collector = Self::default();

        if let Some(schema) = err.downcast_ref::<SchemaError>() {
            collector.schema_hints(schema);
        } else if let Some(config) = err.downcast_ref::<ConfigError>() {
            collector.config_hints(config);
        }
        if let Some(readout) = err.downcast_ref::<ReadoutError>() {
            collector.readout_hints(readout);
        }

        if !collector.typed {
            collector.fallback_hints(err);
        }
        collector.hints
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn config_hints(&mut self, err: &ConfigError) {
        self.typed = true;

        match err {
            ConfigError::Io { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => {
                    self.add("Check that the file path is correct");
                }
                io::ErrorKind::PermissionDenied => {
                    self.add("Check file permissions with `ls -la`");
                }
                _ => self.add("Check the file path, permissions and disk space"),
            },

            ConfigError::UnsupportedFormat(ext) => {
                self.add(format!("'{ext}' is not a configuration format"));
                self.add("Use a .json, .toml, .yaml or .yml file, or pass --infmt");
            }

            ConfigError::Syntax { format, .. } => {
                self.add(format!("The document is not valid {format}"));
                match format {
                    Format::Json => self.add("JSON: check for trailing commas and unquoted keys"),
                    Format::Toml => {
                        self.add("TOML: lists of tables are written as [[training.targets]]")
                    }
                    Format::Yaml => self.add("YAML: check indentation under each split"),
                }
            }

            ConfigError::Serialize { format, .. } => {
                self.add(format!("The configuration cannot be written as {format}"));
                self.add("Try a different output extension");
            }

            ConfigError::Schema(schema) => self.schema_hints(schema),
        }
    }

    fn schema_hints(&mut self, err: &SchemaError) {
        self.typed = true;

        for violation in err.violations() {
            match &violation.kind {
                ViolationKind::Unknown { allowed } => self.add(format!(
                    "Remove '{}' (allowed here: {})",
                    violation.path,
                    allowed.join(", ")
                )),
                ViolationKind::Missing => {
                    self.add(format!("Add the required field '{}'", violation.path))
                }
                ViolationKind::InvalidChoice { allowed, .. } => self.add(format!(
                    "Set '{}' to one of: {}",
                    violation.path,
                    allowed.join(", ")
                )),
                ViolationKind::NotPositive { .. } => self.add(format!(
                    "'{}' must be at least 1; omit it to use the whole split",
                    violation.path
                )),
                ViolationKind::UnknownReference { name, .. } => self.add(format!(
                    "Define a readout named '{name}' in the model configuration or fix '{}'",
                    violation.path
                )),
                _ => {}
            }
        }
    }

    fn readout_hints(&mut self, err: &ReadoutError) {
        self.typed = true;

        match err {
            ReadoutError::FeatureMismatch { stage: "charges", .. } => {
                self.add("The charges postprocess needs a final layer width of 2");
            }
            ReadoutError::FeatureMismatch { .. } => {
                self.add("Check --in-feats against the graph convolution output width");
            }
            ReadoutError::RowMismatch { .. } => {
                self.add("Per-atom postprocessing requires atom pooling");
            }
            ReadoutError::ZeroHardness { .. } => {
                self.add("The hardness column must be non-zero; avoid relu on the final layer");
            }
            _ => {}
        }
    }

    fn fallback_hints(&mut self, err: &Error) {
        let msg = err
            .chain()
            .map(|e| e.to_string().to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");

        if msg.contains("terminal") || msg.contains("stdin") {
            self.add("Provide input via -i/--input or pipe data to stdin");
        } else if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
        } else if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
        }
    }
}
