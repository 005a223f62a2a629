mod data;
mod model;

use data::run_data;
use model::run_model;

use anyhow::{Result, bail};

use crate::cli::{Command, IoOptions};
use crate::display::Context;
use crate::io::stdin_is_tty;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Data(args) => run_data(args, ctx),
        Command::Model(args) => run_model(args, ctx),
    }
}

fn ensure_input(opts: &IoOptions, command: &str) -> Result<()> {
    if opts.input.is_none() && stdin_is_tty() {
        bail!(
            "No input file specified and stdin is a terminal.\n\nUsage: mreadout {command} -i <CONFIG> or pipe a configuration via stdin."
        );
    }
    Ok(())
}
