use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use tabulon::{Cli, Environment, RealEnv, RealStdin};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG overrides -v.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let env = RealEnv;
    let stdin = RealStdin;
    let environment = Environment::new(&env, &stdin).stdout_is_terminal(io::stdout().is_terminal());

    match tabulon::run(&cli, &environment) {
        Ok(output) => {
            if output.ends_with('\n') {
                print!("{output}");
            } else {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::debug!("{err:?}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
