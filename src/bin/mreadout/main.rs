use std::process::ExitCode;

mod cli;
mod commands;
mod display;
mod io;
mod util;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::parse();
    let ctx = display::Context::detect().with_quiet(match &cli.command {
        cli::Command::Data(args) => args.io.quiet,
        cli::Command::Model(args) => args.io.quiet,
    });

    if ctx.interactive {
        display::print_banner();
    }

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
