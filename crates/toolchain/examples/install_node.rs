//! Example: Install Node.js and print the bundled npm version
//!
//! Run with: cargo run -p toolchain --example install_node -- 14.2.0

use std::path::PathBuf;
use toolchain::{Installer, InstallerConfig, ProcessRunner, Version};

fn main() {
    let requested = std::env::args().nth(1).unwrap_or_else(|| "14.2.0".to_string());
    let version: Version = match requested.parse() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let cache = std::env::temp_dir().join("toolchain-example");
    println!("Node.js Installer");
    println!("=================\n");
    println!("Cache: {}", cache.display());

    let installer = match Installer::new(InstallerConfig::new(PathBuf::from(&cache))) {
        Ok(installer) => installer,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    println!("Platform: {}", installer.platform());

    if installer.is_installed(&version) {
        println!("Node.js {version} is already installed.");
    } else {
        println!("Downloading {}", installer.download_url(&version));
    }

    let node = match installer.install(&version) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("\nInstallation failed: {e}");
            eprintln!("Advice: {}", e.category().advice());
            std::process::exit(1);
        }
    };

    println!("  Root: {}", node.root().display());
    match node.version() {
        Ok(v) => println!("  node: {v}"),
        Err(e) => eprintln!("  node --version failed: {e}"),
    }
    match node.npm().run(&["--version".to_string()]) {
        Ok(out) => println!("  npm:  {}", out.trim()),
        Err(e) => eprintln!("  npm --version failed: {e}"),
    }
}
