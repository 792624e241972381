//! Retrieval of encoded certificates from an LDAP directory

use core::time::Duration;

use ldap3::{LdapConn, LdapConnSettings, Scope, SearchEntry};
use log::{debug, error};

use crate::environment::DirectorySettings;
use crate::loader::CertificateLoader;
use crate::util::error::{Error, Result};

/// `LdapCertificateLoader` retrieves encoded certificates from an LDAP directory. A connection is
/// opened per call (connect, search, unbind); connections are not pooled and must not be shared.
/// The search runs with subtree scope under the configured base DN using a serial-number filter,
/// i.e., `(serialNumber=CVR:30808460-FID:94731315)`, or a caller-supplied filter template, and
/// requests the configured binary certificate attribute. Exactly one entry is expected: zero
/// entries fail as not found, more than one as ambiguous.
pub struct LdapCertificateLoader {
    url: String,
    base_dn: String,
    certificate_attribute: String,
    filter_template: Option<String>,
    connect_timeout: Duration,
}

impl LdapCertificateLoader {
    /// Instantiates a new LdapCertificateLoader for the directory at the indicated host and port,
    /// using default settings for the base DN, certificate attribute and connect timeout.
    pub fn new(host: &str, port: u16) -> Self {
        LdapCertificateLoader::from_settings(&DirectorySettings {
            host: host.to_string(),
            port,
            ..Default::default()
        })
    }

    /// Instantiates a new LdapCertificateLoader from the presented directory settings.
    pub fn from_settings(settings: &DirectorySettings) -> Self {
        LdapCertificateLoader {
            url: format!("ldap://{}:{}", settings.host, settings.port),
            base_dn: settings.base_dn.clone(),
            certificate_attribute: settings.certificate_attribute.clone(),
            filter_template: None,
            connect_timeout: settings.connect_timeout,
        }
    }

    /// with_filter replaces the serial-number search filter with a caller-supplied template in
    /// which `{}` is substituted with the lookup key, i.e., `(cn={})`.
    pub fn with_filter(mut self, filter_template: &str) -> Self {
        self.filter_template = Some(filter_template.to_string());
        self
    }

    fn search_filter(&self, key: &str) -> String {
        match &self.filter_template {
            Some(template) => template.replace("{}", key),
            None => format!("(serialNumber={})", key),
        }
    }
}

impl CertificateLoader for LdapCertificateLoader {
    fn load_certificate(&self, key: &str) -> Result<Vec<u8>> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.connect_timeout);
        let mut ldap = match LdapConn::with_settings(settings, &self.url) {
            Ok(ldap) => ldap,
            Err(e) => {
                error!("Failed to connect to {} with {:?}", self.url, e);
                return Err(Error::Network(
                    format!("failed to connect to {}", self.url),
                    Box::new(e),
                ));
            }
        };

        let filter = self.search_filter(key);
        debug!(
            "Searching {} under {} with filter {}",
            self.url, self.base_dn, filter
        );
        let result = ldap
            .search(
                &self.base_dn,
                Scope::Subtree,
                &filter,
                vec![self.certificate_attribute.as_str()],
            )
            .and_then(|r| r.success());
        let _ = ldap.unbind();

        let (entries, _) = match result {
            Ok(result) => result,
            Err(e) => {
                error!("Search for {} at {} failed with {:?}", key, self.url, e);
                return Err(Error::Network(
                    format!("search for {} at {} failed", key, self.url),
                    Box::new(e),
                ));
            }
        };

        if entries.len() > 1 {
            return Err(Error::AmbiguousResult(format!(
                "{} entries found at {} where exactly one was expected",
                entries.len(),
                key
            )));
        }
        let entry = match entries.into_iter().next() {
            Some(entry) => SearchEntry::construct(entry),
            None => return Err(Error::NotFound(format!("no entry found at {}", key))),
        };

        // values that happen to decode as UTF-8 are surfaced via attrs rather than bin_attrs
        if let Some(values) = entry.bin_attrs.get(&self.certificate_attribute) {
            if let Some(value) = values.first() {
                return Ok(value.clone());
            }
        }
        if let Some(values) = entry.attrs.get(&self.certificate_attribute) {
            if let Some(value) = values.first() {
                return Ok(value.clone().into_bytes());
            }
        }
        Err(Error::NotFound(format!(
            "entry found at {} has no {} value",
            key, self.certificate_attribute
        )))
    }
}
