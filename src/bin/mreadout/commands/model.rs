use anyhow::{Context, Result, bail};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use mol_readout::nn::ReadoutModel;
use mol_readout::{Bond, ModelConfig, Molecule};

use crate::cli::ModelArgs;
use crate::display::{Context as DisplayContext, Progress, print_readouts};
use crate::io::{
    describe_input, file_label, load_config, resolve_input_format, resolve_outputs, write_outputs,
};
use crate::util::text::plural;

use super::ensure_input;

pub fn run_model(args: ModelArgs, ctx: DisplayContext) -> Result<()> {
    ensure_input(&args.io, "model")?;
    if args.build.in_feats == 0 {
        bail!("--in-feats must be at least 1");
    }

    let format = resolve_input_format(&args.io)?;
    let outputs = resolve_outputs(&args.io.output)?;
    let total_steps = 3 + u8::from(!outputs.is_empty());

    let mut progress = Progress::new(ctx.interactive, total_steps);

    progress.step("Validating model configuration");
    let config: ModelConfig = load_config(&args.io, format)?;
    progress.complete_step(
        "Validating model configuration",
        &[
            format!("Parse {} from {}", format, describe_input(args.io.input.as_deref())),
            plural(config.readouts.len(), "readout"),
        ],
    );

    progress.step("Building readout heads");
    let mut rng = StdRng::seed_from_u64(args.build.seed);
    let model = ReadoutModel::from_config(&config, args.build.in_feats, &mut rng);
    progress.complete_step(
        "Building readout heads",
        &[
            format!("{} input features, seed {}", args.build.in_feats, args.build.seed),
            plural(model.n_parameters(), "parameter"),
        ],
    );

    progress.step("Running a probe molecule");
    let probe = probe_molecule(args.build.in_feats)?;
    let predictions = model
        .forward(&probe)
        .context("Readout heads failed on a probe molecule")?;
    let shapes: Vec<String> = predictions
        .iter()
        .map(|(name, out)| format!("{name}: {} × {}", out.nrows(), out.ncols()))
        .collect();
    progress.complete_step("Running a probe molecule", &shapes);

    if ctx.interactive {
        print_readouts(&config, &model);
    }

    if !outputs.is_empty() {
        progress.step("Writing normalized configuration");
        write_outputs(&config, &outputs)?;
        let written: Vec<String> = outputs
            .iter()
            .map(|(path, fmt)| format!("Write {} → {}", fmt, file_label(path)))
            .collect();
        progress.complete_step("Writing normalized configuration", &written);
    }

    progress.finish("Model configuration valid");
    Ok(())
}

/// A neutral three-atom chain with constant features.
fn probe_molecule(in_feats: usize) -> Result<Molecule> {
    let features = Array2::from_elem((3, in_feats), 0.1);
    Molecule::new(
        features,
        vec![Bond::new(0, 1), Bond::new(1, 2)],
        vec![0, 0, 0],
    )
    .context("Failed to build probe molecule")
}
