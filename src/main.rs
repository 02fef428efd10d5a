mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use commands::run::Tool;
use std::io;
use toolchain::InstallerConfig;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub config: InstallerConfig,
}

fn main() {
    if let Err(e) = run() {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "cdk-node", &mut io::stdout());
        return Ok(());
    }

    let overrides = config::Overrides {
        cache_root: cli.cache_root,
        download_host: cli.download_host,
    };
    let ctx = Context {
        quiet: cli.quiet,
        config: config::resolve(&overrides, &config::FileConfig::load()?)?,
    };

    match cli.command {
        Command::Install(args) => commands::install::run(&ctx, &args.version),
        Command::Status(args) => commands::status::run(&ctx, &args.version),
        Command::Node(args) => commands::run::run(&ctx, Tool::Node, args),
        Command::Npm(args) => commands::run::run(&ctx, Tool::Npm, args),
        Command::Npx(args) => commands::run::run(&ctx, Tool::Npx, args),
        Command::Completions { .. } => Ok(()),
    }
}
