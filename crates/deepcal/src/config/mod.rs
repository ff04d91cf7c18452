use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::decision::{DecisionError, EngineConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the decision service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
    /// JSON rule set seeded into the store at startup.
    pub rules_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let engine = match env::var("DEEPCAL_ENGINE_CONFIG") {
            Ok(path) if !path.trim().is_empty() => load_engine_config(PathBuf::from(path))?,
            _ => EngineConfig::default(),
        };
        let rules_path = env::var("DEEPCAL_RULES")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine,
            rules_path,
        })
    }
}

/// Reads and validates an engine configuration document.
pub fn load_engine_config(path: PathBuf) -> Result<EngineConfig, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::EngineRead {
        path: path.clone(),
        source,
    })?;
    EngineConfig::from_json(&raw).map_err(|source| ConfigError::Engine { path, source })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    EngineRead {
        path: PathBuf,
        source: std::io::Error,
    },
    Engine {
        path: PathBuf,
        source: DecisionError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EngineRead { path, .. } => {
                write!(f, "unable to read engine config {}", path.display())
            }
            ConfigError::Engine { path, source } => {
                write!(f, "engine config {} rejected: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::EngineRead { source, .. } => Some(source),
            ConfigError::Engine { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("DEEPCAL_ENGINE_CONFIG");
        env::remove_var("DEEPCAL_RULES");
    }

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("deepcal-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).expect("scratch file written");
        path
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.rules_path.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "eighty");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }

    #[test]
    fn engine_config_file_overrides_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let path = scratch_file(
            "engine.json",
            r#"{"truthMin": 0.7, "ruleInfluence": 0.5, "blendCriterion": null}"#,
        );
        env::set_var("DEEPCAL_ENGINE_CONFIG", &path);

        let config = AppConfig::load().expect("engine config loads");
        assert!((config.engine.truth_min - 0.7).abs() < f64::EPSILON);
        assert!((config.engine.rule_influence - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.engine.blend_criterion, None);
        assert!((config.engine.falsity_max - 0.05).abs() < f64::EPSILON);

        reset_env();
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn engine_config_with_unknown_key_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let path = scratch_file("engine-unknown.json", r#"{"truthMinimum": 0.7}"#);
        env::set_var("DEEPCAL_ENGINE_CONFIG", &path);

        match AppConfig::load() {
            Err(ConfigError::Engine {
                source: DecisionError::InvalidConfig(_),
                ..
            }) => {}
            other => panic!("expected engine config rejection, got {other:?}"),
        }

        reset_env();
        std::fs::remove_file(path).ok();
    }
}
