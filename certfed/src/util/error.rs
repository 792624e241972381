//! Error types

use core::fmt;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Error type
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Parse occurs when a certificate reference does not conform to the expected format. The
    /// message identifies the offending reference.
    Parse(String),
    /// UnsupportedVersion occurs when a certificate reference asserts an OCES version that is
    /// recognized but not supported, i.e., OCES1.
    UnsupportedVersion(String),
    /// NotFound occurs when a remote store has no certificate for the presented key, i.e., an
    /// LDAP search returned zero entries or an HTTP request returned a non-200 status. The
    /// message carries the lookup key and, for HTTP, the status code and response body.
    NotFound(String),
    /// AmbiguousResult occurs when an LDAP search returned more than one entry where exactly one
    /// was expected.
    AmbiguousResult(String),
    /// CertificateParse is used to propagate error information from the x509 crate when retrieved
    /// bytes do not decode as a certificate.
    CertificateParse(String, der::Error),
    /// Validation occurs when a retrieved certificate fails post-fetch identity validation, i.e.,
    /// its serial number does not match the one asserted in the reference. The message names both
    /// the requested reference and the serial number actually returned.
    Validation(String),
    /// Length occurs when a retrieved artifact does not conform to length requirements.
    Length(String),
    /// Network occurs when a transport-level failure prevented retrieval. The underlying
    /// transport error is available via [`std::error::Error::source`].
    Network(String, Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "ParseError: {}", msg),
            Error::UnsupportedVersion(msg) => write!(f, "UnsupportedVersionError: {}", msg),
            Error::NotFound(msg) => write!(f, "NotFoundError: {}", msg),
            Error::AmbiguousResult(msg) => write!(f, "AmbiguousResultError: {}", msg),
            Error::CertificateParse(msg, err) => {
                write!(f, "CertificateParseError: {}: {}", msg, err)
            }
            Error::Validation(msg) => write!(f, "ValidationError: {}", msg),
            Error::Length(msg) => write!(f, "LengthError: {}", msg),
            Error::Network(msg, err) => write!(f, "NetworkError: {}: {}", msg, err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CertificateParse(_, err) => Some(err),
            Error::Network(_, err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

#[test]
fn error_test() {
    let _s = format!("{}", Error::Parse("bad reference".to_string()));
    let _s = format!("{}", Error::UnsupportedVersion("OCES1".to_string()));
    let _s = format!("{}", Error::NotFound("no entry found at CVR:1".to_string()));
    let _s = format!("{}", Error::AmbiguousResult("2 entries found".to_string()));
    let _s = format!("{}", Error::Validation("serial mismatch".to_string()));
    let _s = format!("{}", Error::Length("response too large".to_string()));

    let e = Error::Network(
        "GET http://localhost failed".to_string(),
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, "refused")),
    );
    let _s = format!("{}", e);
    use std::error::Error as _;
    assert!(e.source().is_some());
}
