//! `cdk-node status`

use crate::Context;
use crate::ui;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use toolchain::{Client, SystemRunner, Version};

/// Show platform, download URL, install location and cache state.
///
/// With `--quiet` only the installation path is printed, and only when the
/// installation is complete.
pub fn run(ctx: &Context, version: &Version) -> Result<()> {
    let installer = super::installer(ctx)?;
    let dir = installer.installation_dir(version);
    let installed = installer.is_installed(version);
    let client = Client::new(
        installer.platform().family,
        &dir,
        Arc::new(SystemRunner::new()),
    );
    let missing = if installed {
        missing_entry_points(&client)
    } else {
        Vec::new()
    };

    if ctx.quiet {
        if installed && missing.is_empty() {
            ui::path(&dir);
        }
        return Ok(());
    }

    ui::header(&format!("Node.js {version}"));
    ui::kv("Platform", &installer.platform().to_string());
    ui::kv("Download URL", &installer.download_url(version));
    ui::kv("Install dir", &dir.display().to_string());
    ui::kv("Cached", if installed { "yes" } else { "no" });

    if !installed {
        ui::hint(&format!("Run 'cdk-node install {version}' to download it"));
    } else if missing.is_empty() {
        ui::success("Installation is complete");
    } else {
        ui::warn("Installation is incomplete, remove the install dir and install again");
        for path in missing {
            ui::hint(&format!("missing {}", path.display()));
        }
    }

    Ok(())
}

/// Entry points a complete installation must contain but this one lacks
fn missing_entry_points(client: &Client) -> Vec<&Path> {
    [
        client.node_path(),
        client.npm_cli_path(),
        client.npx_cli_path(),
    ]
    .into_iter()
    .filter(|path| !path.exists())
    .collect()
}
