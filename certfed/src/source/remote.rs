//! Composition of a certificate loader and DER decoding into a certificate-by-key store

use der::Decode;
use log::error;
use num_bigint::BigUint;
use x509_cert::Certificate;

use crate::loader::CertificateLoader;
use crate::util::error::{Error, Result};

/// The [`CertificateSource`] trait enables trait objects to provide access to certificates backed
/// via some means, i.e., a remote store, a cache-aside decorator or a test stub.
pub trait CertificateSource {
    /// get_certificate returns the certificate corresponding to the presented key.
    fn get_certificate(&self, key: &str) -> Result<Certificate>;
}

/// parse_certificate decodes the presented bytes as a DER-encoded certificate. Decode failures
/// surface as [`Error::CertificateParse`] naming the key the bytes were retrieved for, distinct
/// from transport errors.
pub fn parse_certificate(key: &str, bytes: &[u8]) -> Result<Certificate> {
    match Certificate::from_der(bytes) {
        Ok(cert) => Ok(cert),
        Err(e) => {
            error!("Failed to parse certificate retrieved for {} with {:?}", key, e);
            Err(Error::CertificateParse(
                format!("failed to parse certificate retrieved for {}", key),
                e,
            ))
        }
    }
}

/// certificate_serial_number returns the serial number of the presented certificate as an
/// unsigned big integer.
pub fn certificate_serial_number(cert: &Certificate) -> BigUint {
    BigUint::from_bytes_be(cert.tbs_certificate.serial_number.as_bytes())
}

/// `RemoteCertificateSource` composes a [`CertificateLoader`] with DER decoding, yielding
/// certificate-by-key.
pub struct RemoteCertificateSource {
    loader: Box<dyn CertificateLoader + Send + Sync>,
}

impl RemoteCertificateSource {
    /// Instantiates a new RemoteCertificateSource backed by the presented loader.
    pub fn new(loader: Box<dyn CertificateLoader + Send + Sync>) -> Self {
        RemoteCertificateSource { loader }
    }
}

impl CertificateSource for RemoteCertificateSource {
    fn get_certificate(&self, key: &str) -> Result<Certificate> {
        let bytes = self.loader.load_certificate(key)?;
        parse_certificate(key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn parse_certificate_from_der() {
        let der_encoded_cert = include_bytes!("../../tests/examples/ca_a.der");
        let cert = parse_certificate("CVR:1-UID:2", der_encoded_cert).unwrap();
        assert_eq!("2171", certificate_serial_number(&cert).to_string());
    }

    #[test]
    fn parse_failure_names_key() {
        let truncated = hex!("30 82 05 FC 30 82");
        let r = parse_certificate("http://ca.example.com/ca.der", &truncated);
        match r {
            Err(Error::CertificateParse(msg, _)) => {
                assert!(msg.contains("http://ca.example.com/ca.der"))
            }
            _ => panic!("expected certificate parse error"),
        }
    }

    struct StaticLoader {
        bytes: Vec<u8>,
    }

    impl CertificateLoader for StaticLoader {
        fn load_certificate(&self, _key: &str) -> Result<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }

    #[test]
    fn source_composes_loader_and_parser() {
        let source = RemoteCertificateSource::new(Box::new(StaticLoader {
            bytes: include_bytes!("../../tests/examples/ca_b.der").to_vec(),
        }));
        let cert = source.get_certificate("CVR:1-UID:2").unwrap();
        assert_eq!("772", certificate_serial_number(&cert).to_string());

        let source = RemoteCertificateSource::new(Box::new(StaticLoader {
            bytes: b"not a certificate".to_vec(),
        }));
        assert!(matches!(
            source.get_certificate("CVR:1-UID:2"),
            Err(Error::CertificateParse(_, _))
        ));
    }
}
