//! Server options and validation.
//!
//! Raw options arrive as a [`ServerOptions`] value, either constructed in
//! code or deserialized from a TOML file. [`validate`] normalizes them into
//! a [`ServerConfig`], loading the private key and certificate material
//! from disk so the rest of the crate never touches the filesystem.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "roost=debug,tower_http=debug";

/// Bind target used when neither `hostname` nor `address` is configured
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Raw server options, prior to validation.
///
/// Unrecognized keys are collected into `extra` and carried through
/// validation untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerOptions {
    /// Path to the TLS private key (PEM)
    pub key: PathBuf,
    /// Path to the TLS certificate (PEM)
    pub cert: PathBuf,
    /// Preferred port (0 = platform-assigned)
    pub port: Option<u16>,
    /// Highest port worth trying when the preferred one is taken
    pub maxport: Option<u16>,
    /// Bind hostname
    pub hostname: Option<String>,
    /// Bind address, consulted when `hostname` is absent
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl ServerOptions {
    /// Reads options from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses options from a TOML document.
    ///
    /// Wrong-typed, fractional, negative, or out-of-range `port`/`maxport`
    /// values are rejected here, as is any document that is not a table of
    /// the expected shape.
    pub fn from_toml(contents: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Validated server configuration.
///
/// `key` and `cert` hold the credential file contents, not paths.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub key: String,
    pub cert: String,
    pub port: Option<u16>,
    pub maxport: Option<u16>,
    pub hostname: Option<String>,
    pub address: Option<String>,
    pub extra: toml::Table,
}

impl ServerConfig {
    /// The host a listener should attach to: `hostname` if set, else
    /// `address`, else the wildcard address.
    pub fn bind_host(&self) -> &str {
        self.hostname
            .as_deref()
            .or(self.address.as_deref())
            .unwrap_or(DEFAULT_BIND_ADDRESS)
    }
}

/// Option validation error.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid option: {0} must be a non-empty string")]
    EmptyField(&'static str),

    #[error("unable to find {field}: {}", path.display())]
    NotFound { field: &'static str, path: PathBuf },
}

/// Validates raw options and loads the TLS credentials from disk.
///
/// Pure with respect to its input: the caller's options are never mutated.
/// Checks short-circuit on the first failure, in the order key, cert,
/// hostname, address. `maxport` below `port` is accepted; it simply leaves
/// no headroom for port hunting.
pub fn validate(options: &ServerOptions) -> Result<ServerConfig, OptionsError> {
    let key = read_credential("private key", &options.key)?;
    let cert = read_credential("public certificate", &options.cert)?;

    if let Some(hostname) = &options.hostname {
        if hostname.is_empty() {
            return Err(OptionsError::EmptyField("hostname"));
        }
    }
    if let Some(address) = &options.address {
        if address.is_empty() {
            return Err(OptionsError::EmptyField("address"));
        }
    }

    Ok(ServerConfig {
        key,
        cert,
        port: options.port,
        maxport: options.maxport,
        hostname: options.hostname.clone(),
        address: options.address.clone(),
        extra: options.extra.clone(),
    })
}

/// Reads a credential file, resolved against the working directory.
fn read_credential(field: &'static str, path: &Path) -> Result<String, OptionsError> {
    if !path.exists() {
        return Err(OptionsError::NotFound {
            field,
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_pem(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn base_options(key: PathBuf, cert: PathBuf) -> ServerOptions {
        ServerOptions {
            key,
            cert,
            port: None,
            maxport: None,
            hostname: None,
            address: None,
            extra: toml::Table::new(),
        }
    }

    #[test]
    fn test_validate_loads_credentials() {
        let dir = TempDir::new().unwrap();
        let key = write_pem(&dir, "key.pem", "KEY CONTENTS");
        let cert = write_pem(&dir, "cert.pem", "CERT CONTENTS");

        let options = base_options(key.clone(), cert.clone());
        let config = validate(&options).unwrap();

        assert_eq!(config.key, "KEY CONTENTS");
        assert_eq!(config.cert, "CERT CONTENTS");
        // The input still holds the paths; validation copies, never mutates.
        assert_eq!(options.key, key);
        assert_eq!(options.cert, cert);
    }

    #[test]
    fn test_validate_missing_key() {
        let dir = TempDir::new().unwrap();
        let cert = write_pem(&dir, "cert.pem", "CERT CONTENTS");

        let options = base_options(dir.path().join("no-such-key.pem"), cert);
        match validate(&options) {
            Err(OptionsError::NotFound { field, .. }) => assert_eq!(field, "private key"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_missing_cert() {
        let dir = TempDir::new().unwrap();
        let key = write_pem(&dir, "key.pem", "KEY CONTENTS");

        let options = base_options(key, dir.path().join("no-such-cert.pem"));
        match validate(&options) {
            Err(OptionsError::NotFound { field, .. }) => assert_eq!(field, "public certificate"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_hostname() {
        let dir = TempDir::new().unwrap();
        let key = write_pem(&dir, "key.pem", "k");
        let cert = write_pem(&dir, "cert.pem", "c");

        let mut options = base_options(key, cert);
        options.hostname = Some(String::new());
        assert!(matches!(
            validate(&options),
            Err(OptionsError::EmptyField("hostname"))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let dir = TempDir::new().unwrap();
        let key = write_pem(&dir, "key.pem", "k");
        let cert = write_pem(&dir, "cert.pem", "c");

        let mut options = base_options(key, cert);
        options.address = Some(String::new());
        assert!(matches!(
            validate(&options),
            Err(OptionsError::EmptyField("address"))
        ));
    }

    #[test]
    fn test_validate_accepts_maxport_below_port() {
        let dir = TempDir::new().unwrap();
        let key = write_pem(&dir, "key.pem", "k");
        let cert = write_pem(&dir, "cert.pem", "c");

        let mut options = base_options(key, cert);
        options.port = Some(8000);
        options.maxport = Some(7000);

        let config = validate(&options).unwrap();
        assert_eq!(config.port, Some(8000));
        assert_eq!(config.maxport, Some(7000));
    }

    #[test]
    fn test_validate_passes_extra_through() {
        let dir = TempDir::new().unwrap();
        let key = write_pem(&dir, "key.pem", "k");
        let cert = write_pem(&dir, "cert.pem", "c");

        let options = ServerOptions::from_toml(&format!(
            "key = \"{}\"\ncert = \"{}\"\nbacklog = 128\nname = \"demo\"",
            key.display(),
            cert.display()
        ))
        .unwrap();

        let config = validate(&options).unwrap();
        assert_eq!(config.extra.get("backlog"), Some(&toml::Value::Integer(128)));
        assert_eq!(
            config.extra.get("name"),
            Some(&toml::Value::String("demo".to_string()))
        );
    }

    #[test]
    fn test_from_toml_rejects_wrong_typed_ports() {
        for bad in [
            "port = \"abc\"",
            "port = -1",
            "port = 3.5",
            "port = 99999",
            "maxport = \"abc\"",
            "maxport = -1",
        ] {
            let doc = format!("key = \"k.pem\"\ncert = \"c.pem\"\n{}", bad);
            assert!(
                matches!(ServerOptions::from_toml(&doc), Err(OptionsError::Parse(_))),
                "expected parse error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_from_toml_rejects_missing_credential_paths() {
        assert!(matches!(
            ServerOptions::from_toml("port = 8080"),
            Err(OptionsError::Parse(_))
        ));
        assert!(matches!(
            ServerOptions::from_toml("key = \"k.pem\""),
            Err(OptionsError::Parse(_))
        ));
    }

    #[test]
    fn test_from_toml_rejects_non_table_document() {
        assert!(matches!(
            ServerOptions::from_toml("42"),
            Err(OptionsError::Parse(_))
        ));
    }

    #[test]
    fn test_bind_host_derivation() {
        let config = ServerConfig {
            key: String::new(),
            cert: String::new(),
            port: None,
            maxport: None,
            hostname: Some("example.com".to_string()),
            address: Some("127.0.0.1".to_string()),
            extra: toml::Table::new(),
        };
        assert_eq!(config.bind_host(), "example.com");

        let config = ServerConfig {
            hostname: None,
            ..config
        };
        assert_eq!(config.bind_host(), "127.0.0.1");

        let config = ServerConfig {
            address: None,
            ..config
        };
        assert_eq!(config.bind_host(), DEFAULT_BIND_ADDRESS);
    }
}
