//! Configuration for the agent worker and the token server
//!
//! Values come from `.env.local`/`.env` files, environment variables, and an
//! optional YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use vyna_agent::config::AgentConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = AgentConfig::from_env()?;
//!
//! // Load from YAML file with environment variables as the base
//! let config = AgentConfig::from_file(Path::new("agent.yaml"))?;
//!
//! println!("Token server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

mod yaml;

pub use yaml::YamlConfig;

use crate::illustration::{
    DEFAULT_ILLUSTRATION_TIMEOUT, Illustration, IllustrationCatalog, IllustrationError,
};
use crate::livekit::{DEFAULT_TOKEN_TTL, TokenIssuer};
use crate::session::SessionOptions;

/// Files read into the environment at startup, in order. Variables that are
/// already set are never overwritten.
pub const DOTENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Upper bound for the illustration RPC timeout. Must stay below the SDK's
/// 5 s default, which has overflowed the transport's duration arithmetic on
/// some platforms.
pub const MAX_RPC_TIMEOUT_MS: u64 = 4_000;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 10001;
const DEFAULT_AGENT_IDENTITY: &str = "vyna-agent";
const DEFAULT_FRONTEND_PREFIX: &str = crate::handlers::connection::PARTICIPANT_IDENTITY_PREFIX;

/// Errors raised while loading or using configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} is not defined")]
    Missing(&'static str),

    #[error("Invalid illustration entry: {0}")]
    Illustration(#[from] IllustrationError),
}

/// Agent configuration
///
/// Contains everything needed to run the agent worker and the token server:
/// - Token server settings (host, port, CORS)
/// - LiveKit credentials and token lifetime
/// - Agent identity, room, and frontend RPC settings
/// - Cache location for downloaded illustration assets
/// - Extra illustrations beyond the built-in catalog
#[derive(Clone)]
pub struct AgentConfig {
    // Token server settings
    pub host: String,
    pub port: u16,

    // LiveKit settings
    pub livekit_url: Option<String>,
    pub livekit_api_key: Option<String>,
    pub livekit_api_secret: Option<String>,
    /// Lifetime of issued join tokens in seconds
    /// Default: 900 (15 minutes)
    pub token_ttl_seconds: u64,

    // Agent worker settings
    pub agent_identity: String,
    /// Room the agent joins in `dev` mode
    pub agent_room: Option<String>,
    /// Identity prefix that marks the frontend participant
    /// Default: "voice_assistant_user_" (the prefix issued by the token server)
    pub frontend_identity_prefix: String,
    /// Response timeout for frontend RPCs in milliseconds
    /// Default: 2000
    pub illustration_rpc_timeout_ms: u64,

    // Cache configuration
    pub cache_path: Option<PathBuf>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: "*"
    pub cors_allowed_origins: Option<String>,

    /// Illustrations added on top of the built-in catalog
    pub illustrations: BTreeMap<String, Illustration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            livekit_url: None,
            livekit_api_key: None,
            livekit_api_secret: None,
            token_ttl_seconds: DEFAULT_TOKEN_TTL.as_secs(),
            agent_identity: DEFAULT_AGENT_IDENTITY.to_string(),
            agent_room: None,
            frontend_identity_prefix: DEFAULT_FRONTEND_PREFIX.to_string(),
            illustration_rpc_timeout_ms: DEFAULT_ILLUSTRATION_TIMEOUT.as_millis() as u64,
            cache_path: None,
            cors_allowed_origins: Some("*".to_string()),
            illustrations: BTreeMap::new(),
        }
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("livekit_url", &self.livekit_url)
            .field("livekit_api_key", &self.livekit_api_key)
            .field(
                "livekit_api_secret",
                &self.livekit_api_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("agent_identity", &self.agent_identity)
            .field("agent_room", &self.agent_room)
            .field("frontend_identity_prefix", &self.frontend_identity_prefix)
            .field("illustration_rpc_timeout_ms", &self.illustration_rpc_timeout_ms)
            .field("cache_path", &self.cache_path)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("illustrations", &self.illustrations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Zeroize the LiveKit secret when the config is dropped.
impl Drop for AgentConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut secret) = self.livekit_api_secret {
            secret.zeroize();
        }
    }
}

/// Which dotenv files were applied, and which could not be read
#[derive(Debug, Default)]
pub struct DotenvReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl DotenvReport {
    /// Emit the outcome once a subscriber is installed.
    pub fn log(&self) {
        for path in &self.loaded {
            debug!(path = %path.display(), "Loaded environment file");
        }
        for (path, error) in &self.failed {
            warn!(path = %path.display(), error = %error, "Ignoring unreadable environment file");
        }
    }
}

/// Load `.env.local` and `.env` from the working directory.
pub fn load_dotenv() -> DotenvReport {
    load_dotenv_from(Path::new("."))
}

/// Load `.env.local` and `.env` from `dir`. Missing files are skipped.
pub fn load_dotenv_from(dir: &Path) -> DotenvReport {
    let mut report = DotenvReport::default();

    for file in DOTENV_FILES {
        let path = dir.join(file);
        match dotenvy::from_path(&path) {
            Ok(()) => report.loaded.push(path),
            Err(e) if e.not_found() => {}
            Err(e) => report.failed.push((path, e.to_string())),
        }
    }

    report
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

impl AgentConfig {
    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::env_base()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variables as base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = YamlConfig::from_file(path)?;
        let mut config = Self::env_base()?;
        config.apply_yaml(yaml);
        config.validate()?;
        Ok(config)
    }

    fn env_base() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = env_var("HOST") {
            config.host = host;
        }
        if let Some(port) = parse_env::<u16>("PORT")? {
            config.port = port;
        }

        config.livekit_url = env_var("LIVEKIT_URL");
        config.livekit_api_key = env_var("LIVEKIT_API_KEY");
        config.livekit_api_secret = env_var("LIVEKIT_API_SECRET");
        if let Some(ttl) = parse_env::<u64>("LIVEKIT_TOKEN_TTL_SECONDS")? {
            config.token_ttl_seconds = ttl;
        }

        if let Some(identity) = env_var("AGENT_IDENTITY") {
            config.agent_identity = identity;
        }
        config.agent_room = env_var("AGENT_ROOM");
        if let Some(prefix) = env_var("FRONTEND_IDENTITY_PREFIX") {
            config.frontend_identity_prefix = prefix;
        }
        if let Some(timeout) = parse_env::<u64>("ILLUSTRATION_RPC_TIMEOUT_MS")? {
            config.illustration_rpc_timeout_ms = timeout;
        }

        config.cache_path = env_var("CACHE_PATH").map(PathBuf::from);
        if let Some(origins) = env_var("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = Some(origins);
        }

        Ok(config)
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
        }

        if let Some(livekit) = yaml.livekit {
            if livekit.url.is_some() {
                self.livekit_url = livekit.url;
            }
            if livekit.api_key.is_some() {
                self.livekit_api_key = livekit.api_key;
            }
            if livekit.api_secret.is_some() {
                self.livekit_api_secret = livekit.api_secret;
            }
            if let Some(ttl) = livekit.token_ttl_seconds {
                self.token_ttl_seconds = ttl;
            }
        }

        if let Some(agent) = yaml.agent {
            if let Some(identity) = agent.identity {
                self.agent_identity = identity;
            }
            if agent.room.is_some() {
                self.agent_room = agent.room;
            }
            if let Some(prefix) = agent.frontend_identity_prefix {
                self.frontend_identity_prefix = prefix;
            }
            if let Some(timeout) = agent.illustration_rpc_timeout_ms {
                self.illustration_rpc_timeout_ms = timeout;
            }
        }

        if let Some(cache) = yaml.cache {
            if cache.path.is_some() {
                self.cache_path = cache.path;
            }
        }

        if let Some(security) = yaml.security {
            if security.cors_allowed_origins.is_some() {
                self.cors_allowed_origins = security.cors_allowed_origins;
            }
        }

        self.illustrations.extend(yaml.illustrations);
    }

    /// Check value ranges and configured illustrations
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.illustration_rpc_timeout_ms == 0
            || self.illustration_rpc_timeout_ms > MAX_RPC_TIMEOUT_MS
        {
            return Err(ConfigError::InvalidValue {
                key: "ILLUSTRATION_RPC_TIMEOUT_MS",
                value: self.illustration_rpc_timeout_ms.to_string(),
                reason: format!("must be between 1 and {MAX_RPC_TIMEOUT_MS}"),
            });
        }

        if self.token_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LIVEKIT_TOKEN_TTL_SECONDS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        if self.agent_identity.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "AGENT_IDENTITY",
                value: self.agent_identity.clone(),
                reason: "must not be empty".to_string(),
            });
        }

        self.illustration_catalog()?;
        Ok(())
    }

    /// Get the token server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.illustration_rpc_timeout_ms)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    /// LiveKit server URL, or the name of the missing variable
    pub fn livekit_url(&self) -> Result<&str, ConfigError> {
        self.livekit_url
            .as_deref()
            .ok_or(ConfigError::Missing("LIVEKIT_URL"))
    }

    /// Token issuer for the configured API key pair
    pub fn token_issuer(&self) -> Result<TokenIssuer, ConfigError> {
        let api_key = self
            .livekit_api_key
            .as_deref()
            .ok_or(ConfigError::Missing("LIVEKIT_API_KEY"))?;
        let api_secret = self
            .livekit_api_secret
            .as_deref()
            .ok_or(ConfigError::Missing("LIVEKIT_API_SECRET"))?;

        Ok(TokenIssuer::new(api_key, api_secret, self.token_ttl()))
    }

    /// Built-in illustrations merged with the configured ones
    pub fn illustration_catalog(&self) -> Result<IllustrationCatalog, ConfigError> {
        let mut catalog = IllustrationCatalog::default();
        catalog.extend(self.illustrations.clone())?;
        Ok(catalog)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            frontend_identity_prefix: Some(self.frontend_identity_prefix.clone())
                .filter(|p| !p.is_empty()),
            rpc_timeout: self.rpc_timeout(),
        }
    }
}
