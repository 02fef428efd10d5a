//! `cdk-node install`

use crate::Context;
use crate::ui;
use anyhow::Result;
use toolchain::Version;

/// Install `version` if needed and print the installation path.
pub fn run(ctx: &Context, version: &Version) -> Result<()> {
    let installer = super::installer(ctx)?;
    let cached = installer.is_installed(version);

    if !cached && !ctx.quiet {
        ui::info(&format!(
            "Downloading Node.js {version} from {}",
            installer.download_url(version)
        ));
    }

    let client = installer.install(version)?;

    if !ctx.quiet {
        if cached {
            ui::success(&format!("Node.js {version} is already installed"));
        } else {
            ui::success(&format!("Installed Node.js {version}"));
        }
    }

    ui::path(client.root());
    Ok(())
}
