//! Cache-aside decoration of a certificate source

use std::sync::{Arc, Mutex};

use log::{debug, info};
use x509_cert::Certificate;

use crate::source::cache::{CacheCategory, CertificateCache};
use crate::source::remote::CertificateSource;
use crate::util::error::Result;

/// `KeyMapper` implementations map a cache key to the key presented to the inner store on a cache
/// miss. The cache entry is always created under the original key.
pub type KeyMapper = Box<dyn Fn(&str) -> String + Send + Sync>;

/// `CertificateValidator` implementations inspect a freshly retrieved certificate before it is
/// cached. A validation failure propagates to the caller and the certificate is not cached.
pub type CertificateValidator = Box<dyn Fn(&str, &Certificate) -> Result<()> + Send + Sync>;

/// `CachingCertificateSource` decorates an inner [`CertificateSource`] with cache-aside behavior
/// against one category of a shared [`CertificateCache`]: a lookup first consults the cache and
/// returns a hit immediately, without contacting the inner store and without re-validation. On a
/// miss the cache key is remapped, the inner store is queried, the validation hook runs, and only
/// then is the certificate cached under the original key.
///
/// The whole check-fetch-validate-store sequence runs under one exclusive lock per store
/// instance, so concurrent callers against the same instance serialize and at most one remote
/// fetch is in flight per instance.
pub struct CachingCertificateSource {
    inner: Arc<dyn CertificateSource + Send + Sync>,
    cache: Arc<CertificateCache>,
    category: CacheCategory,
    key_mapper: KeyMapper,
    validator: CertificateValidator,
    fetch_guard: Arc<Mutex<()>>,
}

impl CachingCertificateSource {
    /// Instantiates a new CachingCertificateSource with an identity key mapping and no
    /// validation.
    pub fn new(
        inner: Arc<dyn CertificateSource + Send + Sync>,
        cache: Arc<CertificateCache>,
        category: CacheCategory,
    ) -> Self {
        CachingCertificateSource::with_hooks(
            inner,
            cache,
            category,
            Box::new(|key| key.to_string()),
            Box::new(|_key, _cert| Ok(())),
        )
    }

    /// Instantiates a new CachingCertificateSource with the presented key-remapping and
    /// validation hooks.
    pub fn with_hooks(
        inner: Arc<dyn CertificateSource + Send + Sync>,
        cache: Arc<CertificateCache>,
        category: CacheCategory,
        key_mapper: KeyMapper,
        validator: CertificateValidator,
    ) -> Self {
        CachingCertificateSource::with_shared_guard(
            inner,
            cache,
            category,
            key_mapper,
            validator,
            Arc::new(Mutex::new(())),
        )
    }

    /// with_shared_guard allows a facade that constructs a store per call to serialize all of its
    /// fetches under a single facade-lifetime lock.
    pub(crate) fn with_shared_guard(
        inner: Arc<dyn CertificateSource + Send + Sync>,
        cache: Arc<CertificateCache>,
        category: CacheCategory,
        key_mapper: KeyMapper,
        validator: CertificateValidator,
        fetch_guard: Arc<Mutex<()>>,
    ) -> Self {
        CachingCertificateSource {
            inner,
            cache,
            category,
            key_mapper,
            validator,
            fetch_guard,
        }
    }
}

impl CertificateSource for CachingCertificateSource {
    fn get_certificate(&self, cache_key: &str) -> Result<Certificate> {
        let _fetch_guard = match self.fetch_guard.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };

        if let Some(cert) = self.cache.get(self.category, cache_key) {
            debug!(
                "Serviced certificate lookup for {} from {} cache",
                cache_key, self.category
            );
            return Ok(cert);
        }

        let remote_key = (self.key_mapper)(cache_key);
        info!("Retrieving certificate for {} from remote store", remote_key);
        let cert = self.inner.get_certificate(&remote_key)?;
        (self.validator)(cache_key, &cert)?;
        self.cache.put(self.category, cache_key, cert.clone());
        Ok(cert)
    }
}
