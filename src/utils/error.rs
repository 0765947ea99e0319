use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Registry request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Job description error in {path}: {message}")]
    JobSpecError { path: String, message: String },

    #[error("Unable to determine the address of this host: {message}")]
    AddressError { message: String },

    #[error("Couldn't build a registry client: {message}")]
    RegistryClientError { message: String },

    #[error("Registry {operation} failed for {id}: {message}")]
    RegistryError {
        operation: &'static str,
        id: String,
        message: String,
    },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Signal handling error: {message}")]
    SignalError { message: String },
}

impl BridgeError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BridgeError::HttpError(_) | BridgeError::RegistryError { .. } => {
                "Check that the Consul agent is reachable and the ACL token is valid"
            }
            BridgeError::IoError(_) | BridgeError::JobSpecError { .. } => {
                "Check that --jobspec points to a readable TOML or Nomad JSON job file"
            }
            BridgeError::SerializationError(_) => "Inspect the registration payload with --debug",
            BridgeError::AddressError { .. } => {
                "Pass --iface or set LOCAL_SERVICE_ADDRESS to pick the advertised address"
            }
            BridgeError::RegistryClientError { .. } => {
                "Check --consul-addr / CONSUL_HTTP_ADDR and --consul-token"
            }
            BridgeError::InvalidConfigValueError { .. } => "Fix the flag value and run again",
            BridgeError::SignalError { .. } => "The process could not install its signal handlers",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
