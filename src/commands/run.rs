//! `cdk-node node|npm|npx`

use crate::Context;
use crate::cli::RunArgs;
use anyhow::{Context as _, Result};
use toolchain::{ExecutionContext, ProcessRunner};

/// Which installed tool to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Node,
    Npm,
    Npx,
}

impl Tool {
    fn name(self) -> &'static str {
        match self {
            Tool::Node => "node",
            Tool::Npm => "npm",
            Tool::Npx => "npx",
        }
    }
}

/// Install the requested version if needed and run `tool` through it.
///
/// Output is streamed to stdout. A failing tool ends this process with the
/// tool's own exit code.
pub fn run(ctx: &Context, tool: Tool, args: RunArgs) -> Result<()> {
    let client = super::installer(ctx)?.install(&args.version)?;
    let context = execution_context(&args);

    let result = match tool {
        Tool::Node => client.run_with(&args.args, &context),
        Tool::Npm => client.npm().run_with(&args.args, &context),
        Tool::Npx => client.npx().run_with(&args.args, &context),
    };

    match result {
        Ok(_) => Ok(()),
        Err(e) => match e.exit_code() {
            Some(code) => {
                log::debug!("{e}");
                std::process::exit(code)
            }
            None => Err(e).with_context(|| format!("{} did not complete", tool.name())),
        },
    }
}

fn execution_context(args: &RunArgs) -> ExecutionContext {
    let mut context = ExecutionContext::new();
    if let Some(dir) = &args.cwd {
        context = context.working_dir(dir);
    }
    for (key, value) in &args.env {
        context = context.env_var(key, value);
    }
    context
}
