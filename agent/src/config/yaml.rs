use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;
use crate::illustration::Illustration;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// here override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 10001
///
/// livekit:
///   url: "ws://localhost:7880"
///   api_key: "devkey"
///   api_secret: "secret"
///   token_ttl_seconds: 900
///
/// agent:
///   identity: "vyna-agent"
///   room: "voice_assistant_room_42"
///   frontend_identity_prefix: "voice_assistant_user_"
///   illustration_rpc_timeout_ms: 2000
///
/// cache:
///   path: "/var/cache/vyna-agent"
///
/// security:
///   cors_allowed_origins: "*"
///
/// illustrations:
///   unit_circle:
///     url: "https://example.com/unit-circle.png"
///     description: "Unit circle with sine and cosine marked"
///     topics: ["trigonometry", "circle"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub livekit: Option<LiveKitYaml>,
    pub agent: Option<AgentYaml>,
    pub cache: Option<CacheYaml>,
    pub security: Option<SecurityYaml>,
    pub illustrations: BTreeMap<String, Illustration>,
}

/// Token server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// LiveKit configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LiveKitYaml {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub token_ttl_seconds: Option<u64>,
}

/// Agent worker configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AgentYaml {
    pub identity: Option<String>,
    pub room: Option<String>,
    pub frontend_identity_prefix: Option<String>,
    pub illustration_rpc_timeout_ms: Option<u64>,
}

/// Cache configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CacheYaml {
    pub path: Option<PathBuf>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
}

impl YamlConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&contents)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(contents).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080

livekit:
  url: "ws://livekit.example.com"
  api_key: "key"
  api_secret: "secret"
  token_ttl_seconds: 600

agent:
  identity: "tutor"
  room: "lesson-1"
  frontend_identity_prefix: "student_"
  illustration_rpc_timeout_ms: 1500

cache:
  path: "/tmp/cache"

security:
  cors_allowed_origins: "https://app.example.com"

illustrations:
  unit_circle:
    url: "https://example.com/unit-circle.png"
    description: "Unit circle"
    topics: ["trigonometry"]
"#;
        let config = YamlConfig::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(8080));

        let livekit = config.livekit.unwrap();
        assert_eq!(livekit.url.as_deref(), Some("ws://livekit.example.com"));
        assert_eq!(livekit.token_ttl_seconds, Some(600));

        let agent = config.agent.unwrap();
        assert_eq!(agent.identity.as_deref(), Some("tutor"));
        assert_eq!(agent.illustration_rpc_timeout_ms, Some(1500));

        assert_eq!(config.cache.unwrap().path, Some(PathBuf::from("/tmp/cache")));
        assert_eq!(
            config.security.unwrap().cors_allowed_origins.as_deref(),
            Some("https://app.example.com")
        );

        let circle = &config.illustrations["unit_circle"];
        assert_eq!(circle.url, "https://example.com/unit-circle.png");
        assert_eq!(circle.topics, vec!["trigonometry".to_string()]);
    }

    #[test]
    fn test_yaml_config_empty() {
        let config = YamlConfig::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.illustrations.is_empty());
    }

    #[test]
    fn test_yaml_config_invalid() {
        assert!(matches!(
            YamlConfig::from_str("server: [unclosed"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_yaml_missing_file() {
        let err = YamlConfig::from_file(Path::new("/nonexistent/agent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
