pub mod install;
pub mod run;
pub mod status;

use crate::Context;
use anyhow::{Context as _, Result};
use toolchain::Installer;

/// Build an installer for the current host from the resolved settings
fn installer(ctx: &Context) -> Result<Installer> {
    Installer::new(ctx.config.clone()).context("No Node.js build is available for this host")
}
