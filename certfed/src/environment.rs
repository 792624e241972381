//! Directory environment selection and settings used when resolving federation certificates

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Host name of the production OCES certificate directory
pub const OCES_PRODUCTION_DIRECTORY_HOST: &str = "crtdir.certifikat.dk";

/// Host name of the preproduction (test) OCES certificate directory
pub const OCES_TEST_DIRECTORY_HOST: &str = "crtdir.pp.certifikat.dk";

/// Default LDAP port
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default base DN for subtree searches in the OCES directories
pub const DEFAULT_BASE_DN: &str = "c=dk";

/// Default LDAP attribute that carries the encoded certificate
pub const DEFAULT_CERTIFICATE_ATTRIBUTE: &str = "userCertificate;binary";

/// Default LDAP connect timeout
pub const DEFAULT_LDAP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `DirectorySettings` describes an LDAP directory from which federation certificates are
/// resolved. Instances are bound into a loader at construction time and are immutable thereafter.
/// The structure can be serialized and deserialized, i.e., to load deployment-specific directory
/// configuration from a JSON file.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct DirectorySettings {
    /// Host name of the directory server
    pub host: String,
    /// Port of the directory server
    pub port: u16,
    /// Base DN under which subtree searches are performed
    pub base_dn: String,
    /// Attribute that carries the encoded certificate
    pub certificate_attribute: String,
    /// Connect timeout applied when opening a connection to the directory
    pub connect_timeout: Duration,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        DirectorySettings {
            host: OCES_PRODUCTION_DIRECTORY_HOST.to_string(),
            port: DEFAULT_LDAP_PORT,
            base_dn: DEFAULT_BASE_DN.to_string(),
            certificate_attribute: DEFAULT_CERTIFICATE_ATTRIBUTE.to_string(),
            connect_timeout: DEFAULT_LDAP_CONNECT_TIMEOUT,
        }
    }
}

/// `FederationEnvironment` selects the certificate directory against which federation certificate
/// references are resolved. `Production` and `Test` run the identical code path against different
/// directories; `Custom` allows nonstandard deployments to supply their own settings.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum FederationEnvironment {
    /// Production OCES certificate directory
    Production,
    /// Preproduction (test) OCES certificate directory
    Test,
    /// Caller-supplied directory settings
    Custom(DirectorySettings),
}

impl FederationEnvironment {
    /// directory_settings returns the settings for the directory selected by this environment.
    pub fn directory_settings(&self) -> DirectorySettings {
        match self {
            FederationEnvironment::Production => DirectorySettings::default(),
            FederationEnvironment::Test => DirectorySettings {
                host: OCES_TEST_DIRECTORY_HOST.to_string(),
                ..Default::default()
            },
            FederationEnvironment::Custom(settings) => settings.clone(),
        }
    }
}
