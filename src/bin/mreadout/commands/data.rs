use anyhow::{Context, Result};

use mol_readout::config::{Schema, check_readouts};
use mol_readout::{DataConfig, ModelConfig};

use crate::cli::DataArgs;
use crate::display::{Context as DisplayContext, Progress, print_data_summary, print_targets};
use crate::io::{
    describe_input, file_label, load_config, resolve_input_format, resolve_outputs, write_outputs,
};
use crate::util::text::plural;

use super::ensure_input;

pub fn run_data(args: DataArgs, ctx: DisplayContext) -> Result<()> {
    ensure_input(&args.io, "data")?;

    let format = resolve_input_format(&args.io)?;
    let outputs = resolve_outputs(&args.io.output)?;
    let total_steps = 1 + u8::from(args.model.is_some()) + u8::from(!outputs.is_empty());

    let mut progress = Progress::new(ctx.interactive, total_steps);

    progress.step("Validating data configuration");
    let data: DataConfig = load_config(&args.io, format)?;
    progress.complete_step("Validating data configuration", &load_details(&data, &args, format));

    if let Some(model_path) = &args.model {
        progress.step("Checking readout names");
        let model = ModelConfig::load(model_path)
            .with_context(|| format!("Invalid model configuration in '{}'", model_path.display()))?;
        check_readouts(&data, &model).with_context(|| {
            format!(
                "Targets refer to readouts missing from '{}'",
                model_path.display()
            )
        })?;
        progress.complete_step(
            "Checking readout names",
            &[format!(
                "All targets resolve against {}",
                plural(model.readouts.len(), "readout")
            )],
        );
    }

    if ctx.interactive {
        print_data_summary(&data);
        print_targets(&data);
    }

    if !outputs.is_empty() {
        progress.step("Writing normalized configuration");
        write_outputs(&data, &outputs)?;
        let written: Vec<String> = outputs
            .iter()
            .map(|(path, fmt)| format!("Write {} → {}", fmt, file_label(path)))
            .collect();
        progress.complete_step("Writing normalized configuration", &written);
    }

    progress.finish("Data configuration valid");
    Ok(())
}

fn load_details(data: &DataConfig, args: &DataArgs, format: mol_readout::Format) -> Vec<String> {
    let splits: Vec<&str> = data.datasets().map(|(split, _)| split.key()).collect();
    let n_targets: usize = data.datasets().map(|(_, d)| d.targets.len()).sum();

    vec![
        format!("Parse {} from {}", format, describe_input(args.io.input.as_deref())),
        format!("Splits: {}", splits.join(", ")),
        plural(n_targets, "target"),
    ]
}
