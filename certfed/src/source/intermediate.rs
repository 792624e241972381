//! Resolution of intermediate CA certificates referenced by URI

use std::sync::Arc;

use x509_cert::Certificate;

use crate::loader::http::HttpCertificateLoader;
use crate::source::cache::{CacheCategory, CertificateCache};
use crate::source::caching::CachingCertificateSource;
use crate::source::remote::{CertificateSource, RemoteCertificateSource};
use crate::util::error::Result;

/// `IntermediateCertificateSource` resolves intermediate CA certificates from the URI carried in
/// a message, i.e., an Authority Information Access style location. The URI serves as both the
/// cache key and the remote key under the [`CacheCategory::IntermediateCert`] partition of the
/// injected cache, and whatever certificate the endpoint returns is accepted.
pub struct IntermediateCertificateSource {
    store: CachingCertificateSource,
}

impl IntermediateCertificateSource {
    /// Instantiates a new IntermediateCertificateSource retrieving over HTTP with default
    /// timeouts, sharing the presented cache.
    pub fn new(cache: Arc<CertificateCache>) -> Self {
        IntermediateCertificateSource::with_source(
            Arc::new(RemoteCertificateSource::new(Box::new(
                HttpCertificateLoader::default(),
            ))),
            cache,
        )
    }

    /// Instantiates a new IntermediateCertificateSource retrieving via the presented loader,
    /// i.e., with nonstandard timeouts.
    pub fn with_loader(loader: HttpCertificateLoader, cache: Arc<CertificateCache>) -> Self {
        IntermediateCertificateSource::with_source(
            Arc::new(RemoteCertificateSource::new(Box::new(loader))),
            cache,
        )
    }

    /// Instantiates a new IntermediateCertificateSource resolving against the presented source,
    /// i.e., for tests or nonstandard transports.
    pub fn with_source(
        source: Arc<dyn CertificateSource + Send + Sync>,
        cache: Arc<CertificateCache>,
    ) -> Self {
        IntermediateCertificateSource {
            store: CachingCertificateSource::new(source, cache, CacheCategory::IntermediateCert),
        }
    }

    /// get_certificate returns the certificate at the presented URI, from cache where possible.
    pub fn get_certificate(&self, uri: &str) -> Result<Certificate> {
        self.store.get_certificate(uri)
    }
}
