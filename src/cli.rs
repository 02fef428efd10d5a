use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use toolchain::Version;

#[derive(Parser)]
#[command(name = "cdk-node")]
#[command(version)]
#[command(
    about = "Install a pinned Node.js and run node, npm and npx through it",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Root of the local cache [default: ~/.m2/repository]
    #[arg(long, global = true, env = "CDK_NODE_CACHE_ROOT", value_name = "DIR")]
    pub cache_root: Option<PathBuf>,

    /// Server hosting the Node.js distributions [default: https://nodejs.org]
    #[arg(long, global = true, env = "CDK_NODE_DOWNLOAD_HOST", value_name = "URL")]
    pub download_host: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install a Node.js version (or reuse the cached one) and print its path
    Install(VersionArgs),

    /// Show where a Node.js version comes from and whether it is cached
    Status(VersionArgs),

    /// Run node
    Node(RunArgs),

    /// Run the npm bundled with Node.js
    Npm(RunArgs),

    /// Run the npx bundled with Node.js
    Npx(RunArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct VersionArgs {
    /// Node.js version, e.g. v14.2.0
    #[arg(id = "node_version", value_name = "VERSION", value_parser = parse_version)]
    pub version: Version,
}

#[derive(Args)]
pub struct RunArgs {
    /// Node.js version, e.g. v14.2.0
    #[arg(id = "node_version", value_name = "VERSION", value_parser = parse_version)]
    pub version: Version,

    /// Working directory for the command
    #[arg(short = 'C', long = "cwd", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable (repeatable)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Arguments passed to the tool
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Parse a version, accepting it with or without the leading `v`
fn parse_version(s: &str) -> Result<Version, String> {
    let s = s.trim();
    let candidate = if s.starts_with('v') {
        s.to_string()
    } else {
        format!("v{s}")
    };
    candidate.parse().map_err(|e| format!("{e}"))
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
