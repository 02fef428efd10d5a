//! Installing pinned Node.js versions into a local cache.
//!
//! Installed versions live under
//! `<cache_root>/org/nodejs/node/<version>/node-<version>-<os>-<arch>`,
//! next to the Maven artifacts when the cache root is the local Maven
//! repository. A version whose directory already exists is reused without
//! touching the network.
//!
//! There is no locking around cache population. Two processes installing the
//! same version at the same time may both download and extract into the same
//! directory, and an interrupted install leaves a partial directory behind
//! that later installs treat as complete. Remove the directory to retry.

use crate::archive;
use crate::backend::Backend;
use crate::backend::http::HttpBackend;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::process::{ProcessRunner, SystemRunner};
use crate::version::Version;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where Node.js distributions are downloaded from by default.
pub const DEFAULT_DOWNLOAD_HOST: &str = "https://nodejs.org";

/// Name of every Node.js archive and installation directory.
const COMPONENT: &str = "node";

/// Cache path segments below the cache root, Maven-coordinate style.
const CACHE_GROUP: [&str; 3] = ["org", "nodejs", "node"];

/// Configuration for an [`Installer`].
///
/// # Example
///
/// ```
/// use toolchain::InstallerConfig;
///
/// let config = InstallerConfig::new("/home/me/.m2/repository")
///     .download_host("https://mirror.example.com/nodejs");
///
/// assert_eq!(config.download_host, "https://mirror.example.com/nodejs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// Root of the local cache.
    pub cache_root: PathBuf,
    /// Base URL serving `/dist/<version>/<archive>`.
    pub download_host: String,
}

impl InstallerConfig {
    /// Create a config for `cache_root` using the default download host.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            download_host: DEFAULT_DOWNLOAD_HOST.to_string(),
        }
    }

    /// Set the download host.
    #[must_use]
    pub fn download_host(mut self, host: impl Into<String>) -> Self {
        self.download_host = host.into();
        self
    }
}

/// Installs Node.js versions for one platform and hands out [`Client`]s.
///
/// # Example
///
/// ```no_run
/// use toolchain::{Installer, InstallerConfig, ProcessRunner, Version};
///
/// let installer = Installer::new(InstallerConfig::new("/tmp/node-cache")).unwrap();
/// let node = installer.install(&Version::new(14, 2, 0)).unwrap();
///
/// let output = node.npm().run(&["--version".to_string()]).unwrap();
/// println!("npm {}", output.trim());
/// ```
pub struct Installer {
    config: InstallerConfig,
    platform: Platform,
    backend: Box<dyn Backend>,
    runner: Arc<dyn ProcessRunner>,
}

impl Installer {
    /// Create an installer for the current host.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` if Node.js has no build for the
    /// host.
    pub fn new(config: InstallerConfig) -> Result<Self> {
        Ok(Self::with_platform(config, Platform::detect()?))
    }

    /// Create an installer for an explicit platform.
    #[must_use]
    pub fn with_platform(config: InstallerConfig, platform: Platform) -> Self {
        Self {
            config,
            platform,
            backend: Box::new(HttpBackend::new()),
            runner: Arc::new(SystemRunner::new()),
        }
    }

    /// Use a custom download backend (useful for testing).
    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn Backend>) -> Self {
        self.backend = backend;
        self
    }

    /// Use a custom process runner for the clients this installer returns.
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// The platform archives are selected for.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The installer configuration.
    #[must_use]
    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Archive file name, e.g. `node-v14.2.0-linux-x64.tar.gz`.
    #[must_use]
    pub fn archive_name(&self, version: &Version) -> String {
        format!(
            "{}.{}",
            self.distribution_name(version),
            self.platform.family.archive_format().extension()
        )
    }

    /// Full download URL of the archive for `version`.
    #[must_use]
    pub fn download_url(&self, version: &Version) -> String {
        format!(
            "{}/dist/{}/{}",
            self.config.download_host.trim_end_matches('/'),
            version,
            self.archive_name(version)
        )
    }

    /// Directory `version` is (or would be) installed into.
    #[must_use]
    pub fn installation_dir(&self, version: &Version) -> PathBuf {
        let mut dir = self.config.cache_root.clone();
        dir.extend(CACHE_GROUP);
        dir.push(version.to_string());
        dir.push(self.distribution_name(version));
        dir
    }

    /// Whether `version` is already in the cache.
    #[must_use]
    pub fn is_installed(&self, version: &Version) -> bool {
        self.installation_dir(version).exists()
    }

    /// Install `version` unless it is cached, and return a client for it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InstallFailed` wrapping the cause if downloading or
    /// unpacking fails. Nothing is retried.
    pub fn install(&self, version: &Version) -> Result<Client> {
        let dest = self.installation_dir(version);

        if dest.exists() {
            log::debug!("Node.js {version} found in cache at {}", dest.display());
        } else {
            self.download_and_extract(version, &dest)
                .map_err(|source| Error::InstallFailed {
                    version: *version,
                    source: Box::new(source),
                })?;
            log::info!("Installed Node.js {version} into {}", dest.display());
        }

        Ok(Client::new(
            self.platform.family,
            dest,
            Arc::clone(&self.runner),
        ))
    }

    /// `node-<version>-<os>-<arch>`
    fn distribution_name(&self, version: &Version) -> String {
        format!("{COMPONENT}-{version}-{}", self.platform.qualifier())
    }

    fn download_and_extract(&self, version: &Version, dest: &Path) -> Result<()> {
        let url = self.download_url(version);
        log::info!("Downloading Node.js {version} for {} from {url}", self.platform);

        // Open before creating the destination so a missing release
        // does not leave an empty cache entry behind
        let mut body = DownloadBody::new(self.backend.open(&url)?);
        fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

        let format = self.platform.family.archive_format();
        if format.is_streamable() {
            return format
                .extract_stream(&mut body, dest)
                .map_err(|err| body.blame(&url, err));
        }

        let mut spool = tempfile::tempfile().map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let size = io::copy(&mut body, &mut spool)
            .map_err(|e| body.blame(&url, Error::io(std::env::temp_dir(), e)))?;
        log::debug!("Downloaded {size} bytes from {url}");

        spool
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        archive::extract_zip(spool, dest)
    }
}

/// Response body that remembers the first error it failed to read with.
///
/// Archive decoders wrap the body, so a transport failure would otherwise
/// surface as an error about the file being written.
struct DownloadBody {
    inner: Box<dyn Read>,
    failure: Option<String>,
}

impl DownloadBody {
    fn new(inner: Box<dyn Read>) -> Self {
        Self {
            inner,
            failure: None,
        }
    }

    /// Turn `err` into `DownloadFailed` if the body was at fault.
    fn blame(&mut self, url: &str, err: Error) -> Error {
        let message = match self.failure.take() {
            Some(message) => message,
            None if err.is_truncated_input() => format!("download ended early: {err}"),
            None => return err,
        };
        Error::DownloadFailed {
            url: url.to_string(),
            message,
        }
    }
}

impl Read for DownloadBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.inner.read(buf);
        if let Err(e) = &result
            && e.kind() != io::ErrorKind::Interrupted
            && self.failure.is_none()
        {
            self.failure = Some(e.to_string());
        }
        result
    }
}
