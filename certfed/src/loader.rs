//! Retrieval of encoded certificates from remote stores over HTTP and LDAP

pub mod http;
pub mod ldap;

pub use crate::{loader::http::*, loader::ldap::*};

use crate::util::error::Result;

/// The [`CertificateLoader`] trait enables trait objects to retrieve encoded certificates from a
/// remote store, i.e., an LDAP directory or an HTTP endpoint. The meaning of the key is
/// implementation-specific: a URL for HTTP retrieval or a directory attribute value for LDAP.
pub trait CertificateLoader {
    /// load_certificate returns the encoded certificate corresponding to the presented key.
    fn load_certificate(&self, key: &str) -> Result<Vec<u8>>;
}
