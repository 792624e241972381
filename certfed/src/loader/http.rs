//! Retrieval of encoded certificates via HTTP GET

use std::time::Duration;

use log::{debug, error};

use crate::loader::CertificateLoader;
use crate::util::error::{Error, Result};

/// Default connect and read timeout in milliseconds
pub const DEFAULT_HTTP_TIMEOUT_MILLIS: u64 = 3000;

/// Default maximum response size in bytes (10 MB)
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// `HttpCertificateLoader` retrieves encoded certificates by issuing an HTTP GET for the presented
/// key, which must be a URL. Timeouts are bound at construction; responses with any status other
/// than 200 fail with a [`Error::NotFound`] carrying the status code and response body.
#[derive(Clone, Debug)]
pub struct HttpCertificateLoader {
    connect_timeout: Duration,
    read_timeout: Duration,
    max_response_size: usize,
}

impl Default for HttpCertificateLoader {
    fn default() -> Self {
        HttpCertificateLoader::new(
            Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MILLIS),
            Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MILLIS),
        )
    }
}

impl HttpCertificateLoader {
    /// Instantiates a new HttpCertificateLoader with the indicated connect and read timeouts.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        HttpCertificateLoader {
            connect_timeout,
            read_timeout,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }

    /// with_max_response_size replaces the maximum number of response bytes accepted before a
    /// retrieval fails with a length error.
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }
}

impl CertificateLoader for HttpCertificateLoader {
    fn load_certificate(&self, key: &str) -> Result<Vec<u8>> {
        let client = match reqwest::blocking::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.read_timeout)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                return Err(Error::Network(
                    format!("failed to prepare HTTP client for {}", key),
                    Box::new(e),
                ))
            }
        };

        debug!("Downloading certificate from {}", key);
        let response = match client.get(key).send() {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to download certificate from {} with {:?}", key, e);
                return Err(Error::Network(format!("GET {} failed", key), Box::new(e)));
            }
        };

        let status = response.status();
        if reqwest::StatusCode::OK != status {
            let body = response.text().unwrap_or_default();
            error!("GET {} returned status {}", key, status);
            return Err(Error::NotFound(format!(
                "GET {} returned status {} with body: {}",
                key,
                status.as_u16(),
                body
            )));
        }

        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                return Err(Error::Network(
                    format!("failed to read response body from {}", key),
                    Box::new(e),
                ))
            }
        };
        if bytes.len() > self.max_response_size {
            return Err(Error::Length(format!(
                "response from {} is {} bytes, which exceeds the {} byte limit",
                key,
                bytes.len(),
                self.max_response_size
            )));
        }
        Ok(bytes.to_vec())
    }
}
