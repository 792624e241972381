//! Resolution of federation certificates referenced by organization identifier

use std::sync::{Arc, Mutex};

use log::error;
use x509_cert::Certificate;

use crate::environment::FederationEnvironment;
use crate::loader::ldap::LdapCertificateLoader;
use crate::reference::{FederationCertificateReference, OcesVersion};
use crate::source::cache::{CacheCategory, CertificateCache};
use crate::source::caching::{CachingCertificateSource, CertificateValidator};
use crate::source::remote::{certificate_serial_number, CertificateSource, RemoteCertificateSource};
use crate::util::error::{Error, Result};

/// `FederationCertificateSource` resolves the certificates of trusted federation parties from a
/// structured reference. References asserting OCES1 are rejected before any lookup. The
/// organization identifier is presented verbatim to an LDAP-backed store decorated with the
/// [`CacheCategory::FederationCert`] partition of the injected cache, and the serial number of a
/// freshly retrieved certificate is validated against the reference before the certificate is
/// cached. Cached certificates are returned without re-validation.
pub struct FederationCertificateSource {
    remote: Arc<dyn CertificateSource + Send + Sync>,
    cache: Arc<CertificateCache>,
    fetch_guard: Arc<Mutex<()>>,
}

impl FederationCertificateSource {
    /// Instantiates a new FederationCertificateSource resolving against the directory selected by
    /// the presented environment, sharing the presented cache.
    pub fn new(environment: &FederationEnvironment, cache: Arc<CertificateCache>) -> Self {
        let loader = LdapCertificateLoader::from_settings(&environment.directory_settings());
        FederationCertificateSource::with_source(
            Arc::new(RemoteCertificateSource::new(Box::new(loader))),
            cache,
        )
    }

    /// Instantiates a new FederationCertificateSource resolving against the presented source,
    /// i.e., for tests or nonstandard directory transports.
    pub fn with_source(
        source: Arc<dyn CertificateSource + Send + Sync>,
        cache: Arc<CertificateCache>,
    ) -> Self {
        FederationCertificateSource {
            remote: source,
            cache,
            fetch_guard: Arc::new(Mutex::new(())),
        }
    }

    /// get_federation_certificate returns the certificate identified by the presented reference.
    /// A directory miss surfaces as [`Error::NotFound`] naming the organization identifier; a
    /// serial number mismatch surfaces as [`Error::Validation`] naming both the requested
    /// reference and the serial number actually returned.
    pub fn get_federation_certificate(
        &self,
        reference: &FederationCertificateReference,
    ) -> Result<Certificate> {
        if OcesVersion::Oces1 == reference.oces_version {
            error!("Rejecting federation certificate reference {}", reference);
            return Err(Error::UnsupportedVersion(
                "OCES-version OCES1 is not supported.".to_string(),
            ));
        }

        let expected = reference.expected_serial_number.clone();
        let requested = reference.to_string();
        let validator: CertificateValidator = Box::new(move |key, cert| {
            let actual = certificate_serial_number(cert);
            if actual != expected {
                error!(
                    "Certificate retrieved for {} has serial number {}, expected {}",
                    key, actual, expected
                );
                return Err(Error::Validation(format!(
                    "certificate retrieved for {} has serial number {} where {} was expected by reference {}",
                    key, actual, expected, requested
                )));
            }
            Ok(())
        });

        // the store is rebuilt per call to bind the reference into the validation hook; the
        // shared guard keeps fetches serialized per facade instance
        let store = CachingCertificateSource::with_shared_guard(
            self.remote.clone(),
            self.cache.clone(),
            CacheCategory::FederationCert,
            Box::new(|key| key.to_string()),
            validator,
            self.fetch_guard.clone(),
        );
        store.get_certificate(&reference.organization_identifier)
    }
}
