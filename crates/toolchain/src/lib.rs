//! # toolchain
//!
//! Pure Rust library for installing pinned Node.js versions and running
//! `node`, `npm` and `npx` from them.
//!
//! This crate provides functionality for:
//! - Resolving the Node.js distribution that matches the current host
//! - Downloading and unpacking it into a shared local cache, once per version
//! - Running the installed tools with streamed output, a chosen working
//!   directory and extra environment variables
//!
//! ## Example
//!
//! ```no_run
//! use toolchain::{ExecutionContext, Installer, InstallerConfig, ProcessRunner, Version};
//!
//! let version: Version = "14.2.0".parse().expect("invalid version");
//! let installer = Installer::new(InstallerConfig::new("/home/me/.m2/repository"))
//!     .expect("unsupported platform");
//!
//! // Downloads on first use, reuses the cache afterwards
//! let node = installer.install(&version).expect("installation failed");
//!
//! let context = ExecutionContext::new()
//!     .working_dir("/home/me/app")
//!     .env_var("CI", "true");
//! node.npm()
//!     .run_with(&["ci".to_string()], &context)
//!     .expect("npm ci failed");
//! ```
//!
//! ## Platforms
//!
//! | Host OS            | Archive   | `node` location  |
//! |--------------------|-----------|------------------|
//! | Linux, macOS, AIX, SunOS | `.tar.gz` | `bin/node` |
//! | Windows            | `.zip`    | `node.exe`       |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod backend;
pub mod client;
pub mod error;
pub mod installer;
pub mod platform;
pub mod process;
pub mod version;

#[cfg(test)]
mod test_utils;

pub use backend::MockBackend;
pub use client::{Client, ScriptRunner};
pub use error::{Error, ErrorCategory, Result};
pub use installer::{DEFAULT_DOWNLOAD_HOST, Installer, InstallerConfig};
pub use platform::{HostInfo, Platform, PlatformFamily};
pub use process::{
    CaptureBuffer, ExecutionContext, MockRunner, OutputSink, ProcessRunner, SystemRunner,
};
pub use version::{ParseVersionError, Version};
