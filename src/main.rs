mod cli;
mod commands;
// matrixcalc entry: parse args, load config, dispatch one subcommand.

use clap::Parser; // trait import enables MatrixCli::parse()
use colored::Colorize;

use matrixcalc::config::{resolve_config_path, Config};

use crate::cli::{Command, MatrixCli};
use crate::commands::calc::CalcArgs;

fn run() -> anyhow::Result<()> {
    let args = MatrixCli::parse();

    let cfg_path = resolve_config_path(&args.config);
    let config = Config::load(cfg_path.as_deref())?;
    let registry_path = config.registry_path(&args.registry);
    matrixcalc::debug_log!("registry file: {}", registry_path.display());

    match args.cmd {
        Command::Calc { operation, a, b, scalar, exact, store } => commands::calc::main(
            CalcArgs { operation, a, b, scalar, exact, store },
            &registry_path,
            config.precision,
        ),
        Command::Check { property, a } => {
            let registry = matrixcalc::core::registry::Registry::open(&registry_path)?;
            commands::check::main(&property, &a, &registry)
        }
        Command::Store { action } => commands::store::main(action, &registry_path),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "err:".red().bold(), e);
        std::process::exit(1);
    }
}
