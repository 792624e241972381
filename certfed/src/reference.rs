//! Parsing of structured federation certificate references

use core::fmt;
use core::str::FromStr;

use num_bigint::BigUint;

use crate::util::error::{Error, Result};

/// `OcesVersion` identifies the OCES certificate standard version asserted in a federation
/// certificate reference. OCES1 is recognized by the parser but rejected before any lookup is
/// attempted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OcesVersion {
    /// Version 1 of the OCES certificate standard
    Oces1,
    /// Version 2 of the OCES certificate standard
    Oces2,
}

impl fmt::Display for OcesVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcesVersion::Oces1 => write!(f, "OCES1"),
            OcesVersion::Oces2 => write!(f, "OCES2"),
        }
    }
}

/// `FederationCertificateReference` is the parsed form of the comma-delimited reference carried in
/// signed federation messages, i.e., `"OCES2,CVR:30808460-FID:94731315,1478017734"`. The
/// organization identifier is used verbatim as the directory lookup key; the serial number is used
/// only to validate the retrieved certificate, never for lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FederationCertificateReference {
    /// OCES version asserted by the reference
    pub oces_version: OcesVersion,
    /// Organization identifier used as the directory lookup key
    pub organization_identifier: String,
    /// Serial number the retrieved certificate is expected to carry
    pub expected_serial_number: BigUint,
}

impl FromStr for FederationCertificateReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(',').collect();
        if 3 != fields.len() {
            return Err(Error::Parse(format!(
                "expected three comma-separated fields in certificate reference but found {} in {}",
                fields.len(),
                s
            )));
        }

        let oces_version = match fields[0] {
            "OCES1" => OcesVersion::Oces1,
            "OCES2" => OcesVersion::Oces2,
            version => {
                return Err(Error::Parse(format!(
                    "unrecognized OCES version {} in certificate reference {}",
                    version, s
                )))
            }
        };

        if fields[1].is_empty() {
            return Err(Error::Parse(format!(
                "empty organization identifier in certificate reference {}",
                s
            )));
        }

        let expected_serial_number = match BigUint::from_str(fields[2]) {
            Ok(serial) => serial,
            Err(_e) => {
                return Err(Error::Parse(format!(
                    "serial number {} in certificate reference {} is not a decimal integer",
                    fields[2], s
                )))
            }
        };

        Ok(FederationCertificateReference {
            oces_version,
            organization_identifier: fields[1].to_string(),
            expected_serial_number,
        })
    }
}

impl fmt::Display for FederationCertificateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.oces_version, self.organization_identifier, self.expected_serial_number
        )
    }
}
