//! Configuration loading from relay.toml and the environment.
//!
//! Secrets come from the environment only. Every other setting may also be
//! given in the TOML file; environment variables win over the file.

use std::path::Path;

use mcp::{McpAuth, OAuthSettings};
use serde::Deserialize;

/// Default config file, read if present.
pub const CONFIG_FILE: &str = "relay.toml";

/// Dotenv file loaded into the environment at startup, if present.
pub const DOTENV_FILE: &str = ".env";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

/// Settings as written in the TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub gemini: GeminiSection,
    pub mcp: McpSection,
    pub server: ServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiSection {
    pub model: Option<String>,
    /// Override for the API endpoint, mostly useful for testing.
    pub base_url: Option<String>,
    pub max_remote_calls: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McpSection {
    pub url: Option<String>,
    pub auth: Option<AuthMode>,
    /// Where the identity provider redirects after sign-in.
    ///
    /// Defaults to this relay's own `/oauth/callback`.
    pub redirect_uri: Option<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// How the relay authenticates to the MCP server when no token is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    OAuth,
    None,
}

impl std::str::FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oauth" => Ok(Self::OAuth),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::Invalid {
                key: "MCP_AUTH",
                value: s.to_string(),
            }),
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path`, or `relay.toml` if it exists, or nothing.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}

/// Load a dotenv file into the process environment.
///
/// Returns whether the file existed. Variables already set are kept.
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(ConfigError::Dotenv(format!(
            "{}: {e}",
            path.as_ref().display()
        ))),
    }
}

/// Fully resolved settings.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub gemini_base_url: Option<String>,
    pub max_remote_calls: usize,
    pub mcp_url: String,
    pub mcp_auth: McpAuth,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Merge file settings with variables looked up through `env`.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let api_key = env("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let model = env("GEMINI_MODEL")
            .or(file.gemini.model)
            .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());

        let host = env("RELAY_HOST")
            .or(file.server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match env("RELAY_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "RELAY_PORT",
                value,
            })?,
            None => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        let mcp_url = env("MCP_BASE_URL")
            .or(file.mcp.url)
            .ok_or(ConfigError::MissingMcpUrl)?;
        let mode = match env("MCP_AUTH") {
            Some(value) => value.parse()?,
            None => file.mcp.auth.unwrap_or(AuthMode::OAuth),
        };
        let mcp_auth = match (env("MCP_AUTH_TOKEN"), mode) {
            (Some(token), _) => McpAuth::Bearer(token),
            (None, AuthMode::None) => McpAuth::None,
            (None, AuthMode::OAuth) => {
                let redirect_uri = file
                    .mcp
                    .redirect_uri
                    .unwrap_or_else(|| format!("http://{host}:{port}/oauth/callback"));
                McpAuth::OAuth(OAuthSettings::new(redirect_uri).with_scopes(file.mcp.scopes))
            }
        };

        Ok(Self {
            api_key,
            model,
            gemini_base_url: file.gemini.base_url,
            max_remote_calls: file
                .gemini
                .max_remote_calls
                .unwrap_or(gemini::DEFAULT_MAX_REMOTE_CALLS),
            mcp_url,
            mcp_auth,
            host,
            port,
        })
    }

    /// Address to listen on.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("max_remote_calls", &self.max_remote_calls)
            .field("mcp_url", &self.mcp_url)
            .field("mcp_auth", &self.mcp_auth)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to load dotenv file {0}")]
    Dotenv(String),

    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("MCP server not configured: set MCP_BASE_URL or mcp.url")]
    MissingMcpUrl,

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
