use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use mol_readout::Format;
use mol_readout::config::Schema;

use crate::cli::IoOptions;

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

/// Returns `true` if stdin is a terminal (interactive).
pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

pub fn resolve_input_format(opts: &IoOptions) -> Result<Format> {
    if let Some(fmt) = opts.input_format {
        return Ok(fmt.into());
    }

    if let Some(path) = &opts.input {
        return Format::from_path(path).with_context(|| {
            format!(
                "Cannot infer format from '{}'. Use --infmt to specify.",
                path.display()
            )
        });
    }

    bail!("Reading from stdin requires --infmt");
}

pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p)
            .with_context(|| format!("Failed to open input file: {}", p.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read configuration from stdin")?;
            Ok(text)
        }
    }
}

/// Reads and validates the configuration named by `opts`.
pub fn load_config<T: Schema>(opts: &IoOptions, format: Format) -> Result<T> {
    let text = read_input(opts.input.as_deref())?;
    let source = describe_input(opts.input.as_deref());
    T::from_str_as(&text, format).with_context(|| format!("Invalid configuration in {source}"))
}

/// Resolves every output path to a format before anything is written.
pub fn resolve_outputs(paths: &[PathBuf]) -> Result<Vec<(PathBuf, Format)>> {
    paths
        .iter()
        .map(|path| {
            let format = Format::from_path(path).with_context(|| {
                format!(
                    "Cannot infer format from '{}'. Use a .json, .toml or .yaml extension.",
                    path.display()
                )
            })?;
            Ok((path.clone(), format))
        })
        .collect()
}

pub fn write_outputs<T: Schema>(config: &T, outputs: &[(PathBuf, Format)]) -> Result<()> {
    for (path, format) in outputs {
        let text = config
            .to_string_as(*format)
            .with_context(|| format!("Failed to render {} output", format))?;
        fs::write(path, text)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    }
    Ok(())
}

pub fn describe_input(path: Option<&Path>) -> String {
    path.map(|p| format!("'{}'", p.display()))
        .unwrap_or_else(|| "stdin".to_string())
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
