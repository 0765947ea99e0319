#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_JOBSPEC: &str = "nomad-jobspec.tmpl";
pub const DEFAULT_CONSUL_ADDR: &str = "http://127.0.0.1:8500";
pub const ADDRESS_ENV: &str = "LOCAL_SERVICE_ADDRESS";

/// Built once at startup and handed to every component that needs it.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub jobspec: PathBuf,
    pub iface: Option<String>,
    pub address: Option<String>,
    pub debug: bool,
    pub json_logs: bool,
    pub dry_run: bool,
    pub registry: RegistryConfig,
}

#[derive(Clone)]
pub struct RegistryConfig {
    pub address: String,
    pub token: Option<String>,
}

impl RegistryConfig {
    /// Accepts `host:port` as well as a full URL, like the Consul CLI does.
    pub fn new(address: &str, token: Option<String>) -> Self {
        let address = address.trim();
        let address = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };
        Self {
            address,
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONSUL_ADDR, None)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            jobspec: PathBuf::from(DEFAULT_JOBSPEC),
            iface: None,
            address: None,
            debug: false,
            json_logs: false,
            dry_run: false,
            registry: RegistryConfig::default(),
        }
    }
}

impl Validate for BridgeConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("jobspec", &self.jobspec.to_string_lossy())?;
        if let Some(iface) = &self.iface {
            validation::validate_non_empty_string("iface", iface)?;
        }
        if let Some(address) = &self.address {
            validation::validate_non_empty_string("address", address)?;
        }
        if !self.dry_run {
            validation::validate_url("consul_addr", &self.registry.address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_address_gets_scheme() {
        assert_eq!(
            RegistryConfig::new("consul.local:8500", None).address,
            "http://consul.local:8500"
        );
        assert_eq!(
            RegistryConfig::new("https://consul.local:8501", None).address,
            "https://consul.local:8501"
        );
    }

    #[test]
    fn test_empty_token_is_dropped() {
        assert!(RegistryConfig::new(DEFAULT_CONSUL_ADDR, Some(String::new()))
            .token
            .is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = RegistryConfig::new(DEFAULT_CONSUL_ADDR, Some("s3cr3t".to_string()));
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validate_defaults() {
        assert!(BridgeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_iface() {
        let config = BridgeConfig {
            iface: Some("  ".to_string()),
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_registry_scheme() {
        let config = BridgeConfig {
            registry: RegistryConfig::new("ftp://consul.local", None),
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());

        let dry = BridgeConfig {
            dry_run: true,
            ..config
        };
        assert!(dry.validate().is_ok());
    }
}
