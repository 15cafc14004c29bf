use crate::secret::SecretProvider;
use crate::server::DEFAULT_CHANNEL_CAPACITY;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// NAS client entry: an address or network and its shared secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Client IP address or network (supports CIDR notation)
    pub address: String,
    /// Shared secret for this client
    pub secret: String,
    /// Optional client name/description
    #[serde(default)]
    pub name: Option<String>,
    /// Enable/disable this client
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Client {
    /// Parse the client address as an IP network.
    pub fn parse_network(&self) -> Result<IpNetwork, ConfigError> {
        if let Ok(network) = self.address.parse::<IpNetwork>() {
            return Ok(network);
        }
        if let Ok(ip) = self.address.parse::<IpAddr>() {
            return Ok(IpNetwork::from(ip));
        }
        Err(ConfigError::Invalid(format!(
            "Invalid client address: {}",
            self.address
        )))
    }

    /// Check if a source IP address matches this client.
    pub fn matches(&self, source_ip: IpAddr) -> Result<bool, ConfigError> {
        let network = self.parse_network()?;
        Ok(network.contains(source_ip))
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listen address for both sockets
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Authentication port (RFC 2865)
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,

    /// Accounting port (RFC 2866)
    #[serde(default = "default_acct_port")]
    pub acct_port: u16,

    /// Default shared secret, used when no client entry matches
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Per-client shared secrets
    #[serde(default)]
    pub clients: Vec<Client>,

    /// Bound on the decoded-packet stream; enqueueing blocks when full
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,

    /// Path to the RADIUS attribute dictionary (JSON array); the stock RFC
    /// 2865/2866 table is used when unset
    #[serde(default)]
    pub radius_dictionary: Option<String>,

    /// Path to the vendor dictionary (JSON array); the stock table is used
    /// when unset
    #[serde(default)]
    pub vendor_dictionary: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_auth_port() -> u16 {
    1812
}

fn default_acct_port() -> u16 {
    1813
}

fn default_secret() -> String {
    "testing123".to_string()
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            auth_port: default_auth_port(),
            acct_port: default_acct_port(),
            secret: default_secret(),
            clients: vec![],
            channel_capacity: default_channel_capacity(),
            log_level: None,
            radius_dictionary: None,
            vendor_dictionary: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Socket address of the authentication port.
    pub fn auth_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket_addr(self.auth_port)
    }

    /// Socket address of the accounting port.
    pub fn acct_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.socket_addr(self.acct_port)
    }

    fn socket_addr(&self, port: u16) -> Result<SocketAddr, ConfigError> {
        let addr: IpAddr = self.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid IP address: {}", self.listen_address))
        })?;
        Ok(SocketAddr::new(addr, port))
    }

    /// First enabled client matching the source IP.
    pub fn find_client(&self, source_ip: IpAddr) -> Option<&Client> {
        for client in &self.clients {
            if !client.enabled {
                continue;
            }
            if let Ok(true) = client.matches(source_ip) {
                return Some(client);
            }
        }
        None
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _: IpAddr = self.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid listen address: {}", self.listen_address))
        })?;

        if self.auth_port == 0 || self.acct_port == 0 {
            return Err(ConfigError::Invalid("Port cannot be 0".to_string()));
        }
        if self.auth_port == self.acct_port {
            return Err(ConfigError::Invalid(
                "Authentication and accounting ports must differ".to_string(),
            ));
        }
        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Channel capacity cannot be 0".to_string(),
            ));
        }

        for client in &self.clients {
            if client.secret.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Client {} has empty secret",
                    client.address
                )));
            }
            client.parse_network()?;
        }

        Ok(())
    }

    /// Create an example configuration.
    pub fn example() -> Self {
        Config {
            listen_address: "0.0.0.0".to_string(),
            auth_port: 1812,
            acct_port: 1813,
            secret: "testing123".to_string(),
            clients: vec![
                Client {
                    address: "192.168.1.0/24".to_string(),
                    secret: "client_secret_1".to_string(),
                    name: Some("Internal Network".to_string()),
                    enabled: true,
                },
                Client {
                    address: "10.0.0.1".to_string(),
                    secret: "client_secret_2".to_string(),
                    name: Some("VPN Gateway".to_string()),
                    enabled: true,
                },
            ],
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_level: Some("info".to_string()),
            radius_dictionary: None,
            vendor_dictionary: None,
        }
    }
}

impl SecretProvider for Config {
    /// Client-specific secret for a matching enabled client, the default
    /// secret otherwise. `nas_ip` arrives as dotted-quad text.
    fn shared_secret(&self, nas_ip: &str) -> String {
        match nas_ip.parse::<IpAddr>() {
            Ok(ip) => self
                .find_client(ip)
                .map(|client| client.secret.clone())
                .unwrap_or_else(|| self.secret.clone()),
            Err(_) => self.secret.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.auth_port, 1812);
        assert_eq!(config.acct_port, 1813);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert!(!config.secret.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.secret = "".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.acct_port = config.auth_port;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_socket_addrs() {
        let config = Config::default();
        assert_eq!(config.auth_addr().unwrap().port(), 1812);
        assert_eq!(config.acct_addr().unwrap().port(), 1813);
    }

    #[test]
    fn test_client_parse_network_cidr() {
        let client = Client {
            address: "192.168.1.0/24".to_string(),
            secret: "secret".to_string(),
            name: None,
            enabled: true,
        };

        let network = client.parse_network().unwrap();
        assert!(network.contains("192.168.1.1".parse().unwrap()));
        assert!(!network.contains("192.168.2.1".parse().unwrap()));
    }

    #[test]
    fn test_client_invalid_address() {
        let client = Client {
            address: "invalid".to_string(),
            secret: "secret".to_string(),
            name: None,
            enabled: true,
        };
        assert!(client.parse_network().is_err());
    }

    #[test]
    fn test_find_client_skips_disabled() {
        let mut config = Config::default();
        config.clients = vec![Client {
            address: "192.168.1.0/24".to_string(),
            secret: "secret1".to_string(),
            name: None,
            enabled: false,
        }];
        assert!(config.find_client("192.168.1.50".parse().unwrap()).is_none());
    }

    #[test]
    fn test_shared_secret_resolution() {
        let mut config = Config::default();
        config.secret = "default_secret".to_string();
        config.clients = vec![Client {
            address: "192.168.1.0/24".to_string(),
            secret: "client_secret".to_string(),
            name: None,
            enabled: true,
        }];

        assert_eq!(config.shared_secret("192.168.1.50"), "client_secret");
        assert_eq!(config.shared_secret("10.0.0.1"), "default_secret");
        assert_eq!(config.shared_secret("not an ip"), "default_secret");
    }
}
