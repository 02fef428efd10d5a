//! Backend traits and implementations for downloading distributions.
//!
//! This module provides the [`Backend`] trait and implementations for
//! fetching archives. The primary implementation is [`http::HttpBackend`],
//! which streams from the Node.js distribution server.
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without network access:
//!
//! ```
//! use std::io::Read;
//! use toolchain::backend::{Backend, MockBackend};
//!
//! let mut mock = MockBackend::new();
//! mock.add_asset("https://nodejs.org/dist/v14.2.0/SHASUMS256.txt", b"abc".to_vec());
//!
//! let mut body = String::new();
//! mock.open("https://nodejs.org/dist/v14.2.0/SHASUMS256.txt")
//!     .unwrap()
//!     .read_to_string(&mut body)
//!     .unwrap();
//! assert_eq!(body, "abc");
//! assert_eq!(mock.request_count(), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};

/// Backend trait for downloads.
///
/// This abstraction allows for different sources of archives
/// (the official server, mirrors, in-memory fixtures) and enables testing.
pub trait Backend: Send + Sync {
    /// Open a streaming reader over the resource at `url`.
    ///
    /// The body is not buffered; callers read it as it arrives.
    ///
    /// # Errors
    ///
    /// Returns `Error::HttpError` if the request fails or the server
    /// answers with an error status.
    fn open(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// Mock backend for testing without network access.
///
/// Serves in-memory assets keyed by URL and records every request, so
/// tests can assert how often the network would have been hit.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    assets: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` at `url`.
    pub fn add_asset(&mut self, url: impl Into<String>, data: Vec<u8>) {
        let mut assets = self.assets.lock().unwrap();
        assets.insert(url.into(), data);
    }

    /// Every URL requested so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Backend for MockBackend {
    fn open(&self, url: &str) -> Result<Box<dyn Read>> {
        self.requests.lock().unwrap().push(url.to_string());

        let assets = self.assets.lock().unwrap();
        let data = assets
            .get(url)
            .cloned()
            .ok_or_else(|| Error::http("HTTP 404", Some(404)))?;

        Ok(Box::new(Cursor::new(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_backend_new() {
        let mock = MockBackend::new();
        assert_eq!(mock.request_count(), 0);
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_mock_backend_serves_asset() {
        let mut mock = MockBackend::new();
        mock.add_asset("mock://node.tar.gz", vec![0x1f, 0x8b]);

        let mut data = Vec::new();
        mock.open("mock://node.tar.gz")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();

        assert_eq!(data, vec![0x1f, 0x8b]);
        assert_eq!(mock.requests(), vec!["mock://node.tar.gz".to_string()]);
    }

    #[test]
    fn test_mock_backend_missing_asset_is_404() {
        let mock = MockBackend::new();

        let err = mock.open("mock://missing").err().unwrap();

        match err {
            Error::HttpError { status, .. } => assert_eq!(status, Some(404)),
            other => panic!("Expected HttpError, got {other:?}"),
        }
        // Failed requests still count
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_mock_backend_clones_share_state() {
        let mut mock = MockBackend::new();
        let handle = mock.clone();
        mock.add_asset("mock://a", b"a".to_vec());

        let _ = handle.open("mock://a").unwrap();

        assert_eq!(mock.request_count(), 1);
    }
}
