use thiserror::Error;

/// One year
const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Registrations may request the ADMIN role directly when true.
    pub allow_self_assigned_role: bool,
    pub bcrypt_cost: u32,
    pub token_ttl_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Upper bound for a single store call made from a request handler
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_self_assigned_role: true,
            bcrypt_cost: 10,
            token_ttl_seconds: 36_000, // 10 hours
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { timeout_ms: 2000 }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AuthConfig::default();

        let server_defaults = ServerConfig::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address);

        let data_dir = std::env::var("DATA_DIR").unwrap_or(server_defaults.data_dir);

        let token_ttl_seconds = parse_env("TOKEN_TTL_SECONDS")?.unwrap_or(defaults.token_ttl_seconds);
        let bcrypt_cost = parse_env("BCRYPT_COST")?.unwrap_or(defaults.bcrypt_cost);
        let timeout_ms = parse_env("STORE_TIMEOUT_MS")?.unwrap_or(StoreConfig::default().timeout_ms);

        let allow_self_assigned_role = match std::env::var("ALLOW_SELF_ASSIGNED_ROLE") {
            Ok(raw) => parse_flag("ALLOW_SELF_ASSIGNED_ROLE", &raw)?,
            Err(_) => defaults.allow_self_assigned_role,
        };

        let config = Config {
            auth: AuthConfig {
                allow_self_assigned_role,
                bcrypt_cost,
                token_ttl_seconds,
            },
            server: ServerConfig {
                bind_address,
                data_dir,
            },
            store: StoreConfig { timeout_ms },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }
        if self.auth.token_ttl_seconds == 0 || self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "TOKEN_TTL_SECONDS must be between 1 and {MAX_TOKEN_TTL_SECONDS}"
            )));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::ValidationError(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if self.store.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "STORE_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        if self.auth.allow_self_assigned_role {
            tracing::warn!(
                "Self-assigned roles are enabled: registrations may request ADMIN. \
                 Set ALLOW_SELF_ASSIGNED_ROLE=false outside development."
            );
        }

        Ok(())
    }

    pub fn store_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.store.timeout_ms)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        let secs = self.auth.token_ttl_seconds.min(MAX_TOKEN_TTL_SECONDS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(0))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::ValidationError(format!("{name} is not a valid number: {raw}"))),
        Err(_) => Ok(None),
    }
}

/// Parse a boolean flag, case-insensitively. Unknown values are rejected.
fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ValidationError(format!(
            "{name} must be true or false, got: {raw}"
        ))),
    }
}
