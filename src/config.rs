use clap::Parser;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Owner used for writes when no authenticated user is available.
pub const DEFAULT_USER_ID: &str = "9af59216-0ecd-4ba4-a08e-e15dfd2cad76";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3333;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_REQUESTS_PER_SECOND: u32 = 20;
const DEFAULT_BURST_SIZE: u32 = 40;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Require JWT authentication
    #[arg(long, env = "JWT_REQUIRED")]
    pub jwt_required: Option<bool>,

    /// Enable rate limiting
    #[arg(long, env = "RATE_LIMIT_ENABLED")]
    pub rate_limit_enabled: Option<bool>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub resilience: ResilienceConfig,
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Prefix the API is nested under, e.g. `/api`. Empty serves at the root.
    #[serde(default)]
    pub base_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    pub jwt_required: bool,
    #[serde(default)]
    pub jwt_secret: String,
    /// Falls back to this owner when a request carries no token.
    #[serde(default)]
    pub default_user_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub timeout_disabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceProvider {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    pub provider: PersistenceProvider,
    #[serde(default)]
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            base_path: String::new(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_required: false,
            jwt_secret: String::new(),
            default_user_id: Some(DEFAULT_USER_ID.to_string()),
        }
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: false,
            timeout_disabled: false,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            burst_size: DEFAULT_BURST_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            provider: PersistenceProvider::Postgres,
            database_url: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl SecurityConfig {
    /// The configured fallback owner, if one is set and well-formed.
    pub fn default_user(&self) -> Option<Uuid> {
        self.default_user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .and_then(|id| Uuid::parse_str(id).ok())
    }
}

impl ResilienceConfig {
    pub fn request_timeout(&self) -> Duration {
        if self.timeout_disabled {
            // Effectively off while keeping the layer stack the same type.
            Duration::from_secs(365 * 24 * 60 * 60)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.port", DEFAULT_PORT)?
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.base_path", "")?
            .set_default("security.jwt_required", false)?
            .set_default("security.jwt_secret", "")?
            .set_default("security.default_user_id", DEFAULT_USER_ID)?
            .set_default("resilience.rate_limit_enabled", false)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.requests_per_second", DEFAULT_REQUESTS_PER_SECOND)?
            .set_default("resilience.burst_size", DEFAULT_BURST_SIZE)?
            .set_default("resilience.timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("persistence.provider", "postgres")?
            .set_default("persistence.database_url", "")?
            .set_default("persistence.max_connections", DEFAULT_MAX_CONNECTIONS)?;

        // 2. Config file: explicit path must exist, ./config.yaml is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::new("config.yaml", FileFormat::Yaml).required(false)),
        };

        // 3. Environment variables, e.g. MEMORIES_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("MEMORIES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and their dedicated env vars) win over everything
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(url) = cli.database_url {
            builder = builder.set_override("persistence.database_url", url)?;
        }
        if let Some(required) = cli.jwt_required {
            builder = builder.set_override("security.jwt_required", required)?;
        }
        if let Some(rl) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rl)?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Reject combinations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_required && self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "security.jwt_secret must be set when security.jwt_required is true".to_string(),
            ));
        }

        if let Some(raw) = self.security.default_user_id.as_deref()
            && !raw.trim().is_empty()
            && self.security.default_user().is_none()
        {
            return Err(ConfigError::Message(format!(
                "security.default_user_id is not a UUID: {raw}"
            )));
        }

        if self.persistence.provider == PersistenceProvider::Postgres
            && self.persistence.database_url.trim().is_empty()
        {
            return Err(ConfigError::Message(
                "persistence.database_url is required for the postgres provider".to_string(),
            ));
        }

        if self.persistence.max_connections == 0 {
            return Err(ConfigError::Message(
                "persistence.max_connections must be positive".to_string(),
            ));
        }

        if self.resilience.requests_per_second == 0 || self.resilience.burst_size == 0 {
            return Err(ConfigError::Message(
                "resilience.requests_per_second and resilience.burst_size must be positive"
                    .to_string(),
            ));
        }

        let base = &self.server.base_path;
        if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
            return Err(ConfigError::Message(format!(
                "server.base_path must start with '/' and not end with '/': {base}"
            )));
        }

        Ok(())
    }
}
