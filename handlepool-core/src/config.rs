//! Client configuration handed to factories.
//!
//! [`ClientConfig`] is an immutable value with named fields and defaults. It
//! is built through [`ClientConfigBuilder`] and validated once, at
//! [`build`](ClientConfigBuilder::build) or [`from_json`](ClientConfig::from_json).
//! The registry treats it as opaque; only factories read it.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{Error, Result};

const DEFAULT_ADDRESS: &str = "localhost:19530";
const DEFAULT_DATABASE: &str = "default";

/// Connection settings for a driver client.
///
/// Durations are stored in milliseconds so the serialized form stays plain
/// JSON numbers.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use handlepool_core::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .address("10.0.0.7:19530")
///     .auth("root", "secret")
///     .database("embeddings")
///     .retry(3, Duration::from_secs(2))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.address(), "10.0.0.7:19530");
/// assert_eq!(config.max_retry(), 3);
/// assert_eq!(config.connect_timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    address: String,
    username: String,
    password: String,
    database: String,
    api_key: Option<String>,
    enable_tls: bool,
    connect_timeout_ms: u64,
    operation_timeout_ms: u64,
    max_retry: u32,
    max_retry_backoff_ms: u64,
    keepalive_time_ms: u64,
    keepalive_timeout_ms: u64,
    max_recv_msg_size: usize,
}

impl Default for ClientConfig {
    /// Defaults:
    /// - address: `localhost:19530`
    /// - database: `default`
    /// - connect timeout: 5 seconds
    /// - operation timeout: 30 seconds
    /// - keepalive: every 10 seconds, 20 second timeout
    /// - max receive message size: 64 MiB
    /// - retries: left to the driver
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            username: String::new(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            api_key: None,
            enable_tls: false,
            connect_timeout_ms: 5_000,
            operation_timeout_ms: 30_000,
            max_retry: 0,
            max_retry_backoff_ms: 0,
            keepalive_time_ms: 10_000,
            keepalive_timeout_ms: 20_000,
            max_recv_msg_size: 64 * 1024 * 1024,
        }
    }
}

impl ClientConfig {
    /// Starts a builder seeded with the defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parses a JSON document. Omitted fields take their defaults; the result
    /// is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("parse config failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("serialize config failed: {}", e)))
    }

    /// Checks field invariants.
    pub fn validate(&self) -> Result<()> {
        validate_address(&self.address)?;

        if self.connect_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "connect timeout must be greater than 0".into(),
            ));
        }
        if self.operation_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "operation timeout must be greater than 0".into(),
            ));
        }
        if self.keepalive_time_ms > 0 && self.keepalive_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "keepalive timeout must be greater than 0 when keepalive is enabled".into(),
            ));
        }
        if self.max_recv_msg_size == 0 {
            return Err(Error::InvalidConfig(
                "max receive message size must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// A context whose deadline is the connect timeout, for bounding a dial.
    pub fn connect_context(&self) -> Context {
        Context::with_timeout(self.connect_timeout())
    }

    /// Service address, `host:port`.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Username, empty when authentication is disabled.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password, empty when authentication is disabled.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Database selected after connecting.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// API key, if token authentication is used.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Whether the connection uses TLS.
    pub fn enable_tls(&self) -> bool {
        self.enable_tls
    }

    /// Upper bound on establishing the connection.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Upper bound on a single forwarded operation.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Retry count handed to the driver. Zero keeps the driver's default.
    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    /// Maximum backoff between driver retries. Zero keeps the driver's default.
    pub fn max_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.max_retry_backoff_ms)
    }

    /// Interval between keepalive pings. Zero disables keepalive.
    pub fn keepalive_time(&self) -> Duration {
        Duration::from_millis(self.keepalive_time_ms)
    }

    /// How long to wait for a keepalive ack.
    pub fn keepalive_timeout(&self) -> Duration {
        Duration::from_millis(self.keepalive_timeout_ms)
    }

    /// Largest message the client accepts, in bytes.
    pub fn max_recv_msg_size(&self) -> usize {
        self.max_recv_msg_size
    }

    /// Returns true if a retry policy was configured.
    pub fn has_retry_policy(&self) -> bool {
        self.max_retry > 0 || self.max_retry_backoff_ms > 0
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("database", &self.database)
            .field("api_key", &self.api_key.as_deref().map(redact))
            .field("enable_tls", &self.enable_tls)
            .field("connect_timeout", &self.connect_timeout())
            .field("operation_timeout", &self.operation_timeout())
            .field("max_retry", &self.max_retry)
            .field("max_retry_backoff", &self.max_retry_backoff())
            .field("keepalive_time", &self.keepalive_time())
            .field("keepalive_timeout", &self.keepalive_timeout())
            .field("max_recv_msg_size", &self.max_recv_msg_size)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "***"
    }
}

fn validate_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(Error::InvalidConfig("address must not be empty".into()));
    }
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidConfig(format!("address {} has no port", address)))?;
    if host.is_empty() {
        return Err(Error::InvalidConfig(format!("address {} has no host", address)));
    }
    port.parse::<u16>()
        .map_err(|_| Error::InvalidConfig(format!("address {} has invalid port", address)))?;
    Ok(())
}

/// Builder for [`ClientConfig`]. Each setter is chainable; nothing is checked
/// until [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Sets the service address, `host:port`.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    /// Sets username and password.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    /// Sets the database to use after connecting.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Sets an API key for token authentication.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Enables or disables TLS.
    pub fn tls(mut self, enable: bool) -> Self {
        self.config.enable_tls = enable;
        self
    }

    /// Sets connect and per-operation timeouts.
    pub fn timeouts(mut self, connect: Duration, operation: Duration) -> Self {
        self.config.connect_timeout_ms = millis(connect);
        self.config.operation_timeout_ms = millis(operation);
        self
    }

    /// Sets the driver's retry count and maximum backoff.
    pub fn retry(mut self, max_retry: u32, max_backoff: Duration) -> Self {
        self.config.max_retry = max_retry;
        self.config.max_retry_backoff_ms = millis(max_backoff);
        self
    }

    /// Sets keepalive interval and ack timeout. A zero interval disables it.
    pub fn keepalive(mut self, time: Duration, timeout: Duration) -> Self {
        self.config.keepalive_time_ms = millis(time);
        self.config.keepalive_timeout_ms = millis(timeout);
        self
    }

    /// Sets the largest accepted message size in bytes.
    pub fn max_recv_msg_size(mut self, bytes: usize) -> Self {
        self.config.max_recv_msg_size = bytes;
        self
    }

    /// Validates and returns the config.
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::builder().build().unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.address(), "localhost:19530");
        assert_eq!(config.database(), "default");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.operation_timeout(), Duration::from_secs(30));
        assert!(!config.has_retry_policy());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = ClientConfig::builder()
            .address("milvus.internal:19530")
            .auth("root", "Milvus")
            .api_key("tok")
            .tls(true)
            .timeouts(Duration::from_secs(1), Duration::from_secs(10))
            .retry(3, Duration::from_secs(2))
            .keepalive(Duration::from_secs(30), Duration::from_secs(5))
            .max_recv_msg_size(1024)
            .build()
            .unwrap();

        assert_eq!(config.username(), "root");
        assert_eq!(config.password(), "Milvus");
        assert_eq!(config.api_key(), Some("tok"));
        assert!(config.enable_tls());
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert_eq!(config.max_retry_backoff(), Duration::from_secs(2));
        assert_eq!(config.keepalive_time(), Duration::from_secs(30));
        assert_eq!(config.max_recv_msg_size(), 1024);
        assert!(config.has_retry_policy());
    }

    #[test]
    fn test_rejects_bad_address() {
        for address in ["", "localhost", ":19530", "localhost:port", "localhost:70000"] {
            let err = ClientConfig::builder().address(address).build().unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "{}", address);
        }
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        let err = ClientConfig::builder()
            .timeouts(Duration::ZERO, Duration::from_secs(1))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("connect timeout"));

        let err = ClientConfig::builder()
            .keepalive(Duration::from_secs(1), Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("keepalive"));

        // Disabled keepalive does not need a timeout.
        assert!(ClientConfig::builder()
            .keepalive(Duration::ZERO, Duration::ZERO)
            .build()
            .is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            ClientConfig::from_json(r#"{"address": "db:19530", "max_retry": 5}"#).unwrap();
        assert_eq!(config.address(), "db:19530");
        assert_eq!(config.max_retry(), 5);
        assert_eq!(config.database(), "default");
        assert_eq!(config.operation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_json_validates() {
        assert!(ClientConfig::from_json(r#"{"address": "nope"}"#).is_err());
        assert!(ClientConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = ClientConfig::builder().auth("u", "p").build().unwrap();
        let json = config.to_json().unwrap();
        assert_eq!(ClientConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::builder()
            .auth("root", "hunter2")
            .api_key("sk-123")
            .build()
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("sk-123"));
        assert!(debug.contains("root"));
    }

    #[test]
    fn test_connect_context_uses_connect_timeout() {
        let config = ClientConfig::builder()
            .timeouts(Duration::from_secs(60), Duration::from_secs(60))
            .build()
            .unwrap();
        let remaining = config.connect_context().remaining().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(50));
    }
}
