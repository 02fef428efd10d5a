//! HTTP download backend.
//!
//! This module provides the [`HttpBackend`] implementation, a thin wrapper
//! around a blocking `ureq` agent that hands the response body out as a
//! stream instead of reading it into memory.

use crate::backend::Backend;
use crate::error::Result;
use std::io::Read;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("cdk-node-toolchain/", env!("CARGO_PKG_VERSION"));

/// HTTP backend.
///
/// # Example
///
/// ```no_run
/// use std::io::Read;
/// use toolchain::backend::Backend;
/// use toolchain::backend::http::HttpBackend;
///
/// let backend = HttpBackend::new();
/// let mut index = String::new();
/// backend
///     .open("https://nodejs.org/dist/index.json")
///     .unwrap()
///     .read_to_string(&mut index)
///     .unwrap();
/// ```
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Create a new HTTP backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for HttpBackend {
    fn open(&self, url: &str) -> Result<Box<dyn Read>> {
        log::debug!("GET {url}");

        let response = self
            .agent
            .get(url)
            .header("Accept", "application/octet-stream")
            .header("User-Agent", USER_AGENT)
            .call()?;

        Ok(Box::new(response.into_body().into_reader()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_crate_version() {
        assert!(USER_AGENT.starts_with("cdk-node-toolchain/"));
        assert!(USER_AGENT.len() > "cdk-node-toolchain/".len());
    }

    #[test]
    fn test_malformed_url_is_an_http_error_without_status() {
        let backend = HttpBackend::default();

        match backend.open("not a url") {
            Err(err @ crate::Error::HttpError { status: None, .. }) => {
                assert!(err.is_retryable());
            }
            Err(other) => panic!("Expected HttpError without status, got {other:?}"),
            Ok(_) => panic!("Expected a malformed URL to be refused"),
        }
    }
}
