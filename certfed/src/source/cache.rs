//! Provides a category-partitioned in-memory certificate cache

use core::fmt;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Mutex;

use log::debug;
use x509_cert::Certificate;

/// `CacheCategory` partitions the key space of a [`CertificateCache`]. Categories are independent
/// namespaces: a key cached under one category is invisible under another.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum CacheCategory {
    /// Certificates of trusted federation parties, keyed by organization identifier
    FederationCert,
    /// Intermediate CA certificates, keyed by the URI they were retrieved from
    IntermediateCert,
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheCategory::FederationCert => write!(f, "FederationCert"),
            CacheCategory::IntermediateCert => write!(f, "IntermediateCert"),
        }
    }
}

type EntryMap = BTreeMap<(CacheCategory, String), Certificate>;

/// `CertificateCache` is an unbounded process-lifetime map from (category, key) to certificate.
/// Entries are created only on successful retrieval and are never evicted; an existing entry is
/// not overwritten with a different value for the same key. The cache is shared by reference
/// (typically an `Arc`) across the stores that should share hits; it imposes no singleton and its
/// sharing scope is entirely the caller's choice.
#[derive(Default)]
pub struct CertificateCache {
    entries: Mutex<EntryMap>,
}

impl CertificateCache {
    /// Instantiates a new empty CertificateCache.
    pub fn new() -> Self {
        CertificateCache::default()
    }

    /// get returns the certificate cached under the presented category and key, or None if no
    /// such entry exists. An absent category or key is not an error.
    pub fn get(&self, category: CacheCategory, key: &str) -> Option<Certificate> {
        let entries = if let Ok(g) = self.entries.lock() {
            g
        } else {
            return None;
        };
        entries.get(&(category, key.to_string())).cloned()
    }

    /// put adds an entry for the presented category and key. Where an entry already exists it is
    /// left in place and the presented certificate is ignored.
    pub fn put(&self, category: CacheCategory, key: &str, certificate: Certificate) {
        let mut entries = if let Ok(g) = self.entries.lock() {
            g
        } else {
            return;
        };
        match entries.entry((category, key.to_string())) {
            Entry::Vacant(e) => {
                debug!("Adding certificate for {} to {} cache", key, category);
                e.insert(certificate);
            }
            Entry::Occupied(_) => {
                debug!(
                    "Ignoring certificate for {} already present in {} cache",
                    key, category
                );
            }
        }
    }

    /// len returns the number of entries cached under the presented category.
    pub fn len(&self, category: CacheCategory) -> usize {
        let entries = if let Ok(g) = self.entries.lock() {
            g
        } else {
            return 0;
        };
        entries.keys().filter(|(c, _)| *c == category).count()
    }

    /// is_empty returns true if no entries are cached under the presented category.
    pub fn is_empty(&self, category: CacheCategory) -> bool {
        0 == self.len(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Decode;

    fn test_cert() -> Certificate {
        let der_encoded_cert = include_bytes!("../../tests/examples/ca_a.der");
        Certificate::from_der(der_encoded_cert).unwrap()
    }

    fn other_cert() -> Certificate {
        let der_encoded_cert = include_bytes!("../../tests/examples/ca_b.der");
        Certificate::from_der(der_encoded_cert).unwrap()
    }

    #[test]
    fn categories_partition_key_space() {
        let cache = CertificateCache::new();
        cache.put(CacheCategory::FederationCert, "CVR:1-UID:2", test_cert());

        assert!(cache.get(CacheCategory::IntermediateCert, "CVR:1-UID:2").is_none());
        assert!(cache.get(CacheCategory::FederationCert, "CVR:1-UID:2").is_some());
        assert_eq!(1, cache.len(CacheCategory::FederationCert));
        assert!(cache.is_empty(CacheCategory::IntermediateCert));
    }

    #[test]
    fn absent_key_is_not_an_error() {
        let cache = CertificateCache::new();
        assert!(cache.get(CacheCategory::FederationCert, "CVR:1-UID:2").is_none());
    }

    #[test]
    fn first_write_wins() {
        let cache = CertificateCache::new();
        cache.put(CacheCategory::IntermediateCert, "http://ca.example.com/ca.der", test_cert());
        cache.put(CacheCategory::IntermediateCert, "http://ca.example.com/ca.der", other_cert());

        let cached = cache
            .get(CacheCategory::IntermediateCert, "http://ca.example.com/ca.der")
            .unwrap();
        assert_eq!(test_cert(), cached);
        assert_eq!(1, cache.len(CacheCategory::IntermediateCert));
    }
}
