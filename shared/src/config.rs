use crate::{Error, Result};
use std::fmt;
use std::time::Duration;

const ENV_FOLDER: &str = "./conf";
const SCOPES: [&str; 4] = ["local", "test", "qa", "prod"];

/// Which `CharacterStore` implementation backs the resolver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Sql,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Applied to every storage operation and every upstream request
    pub timeout: Duration,
    pub upstream_url: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_TIMEOUT_MS: u64 = 2000;
    const DEFAULT_UPSTREAM_URL: &str = "https://dragonball-api.com/api";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("CAPSULE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let http_port = parse_or(&lookup, "CAPSULE_HTTP_PORT", Self::DEFAULT_HTTP_PORT)?;

        let store = match lookup("CAPSULE_STORE").as_deref() {
            None | Some("sql") => StoreKind::Sql,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(Error::Config(format!(
                    "CAPSULE_STORE must be 'sql' or 'memory', got '{}'",
                    other
                )));
            }
        };

        let database_url = lookup("CAPSULE_DATABASE_URL").filter(|url| !url.is_empty());
        if store == StoreKind::Sql && database_url.is_none() {
            return Err(Error::Config(
                "CAPSULE_DATABASE_URL is required when CAPSULE_STORE=sql".to_string(),
            ));
        }

        let db_max_connections = parse_or(
            &lookup,
            "CAPSULE_DB_MAX_CONNECTIONS",
            Self::DEFAULT_DB_MAX_CONNECTIONS,
        )?;

        let timeout_ms = parse_or(&lookup, "CAPSULE_TIMEOUT_MS", Self::DEFAULT_TIMEOUT_MS)?;
        if timeout_ms == 0 {
            return Err(Error::Config(
                "CAPSULE_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }

        let upstream_url = lookup("CAPSULE_UPSTREAM_URL")
            .unwrap_or_else(|| Self::DEFAULT_UPSTREAM_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let allowed_origins = lookup("CAPSULE_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            http_port,
            store,
            database_url,
            db_max_connections,
            timeout: Duration::from_millis(timeout_ms),
            upstream_url,
            allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }
}

/// Where `load_env_files` found its variables; logged by the caller once
/// tracing is up, since `RUST_LOG` may come from these files
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvSource {
    Scoped(String),
    DotEnv,
    System,
}

impl fmt::Display for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvSource::Scoped(path) => write!(f, "Loaded environment variables from {}", path),
            EnvSource::DotEnv => write!(f, "Loaded environment variables from .env file"),
            EnvSource::System => {
                write!(f, "No .env file found, using system environment variables")
            }
        }
    }
}

/// Loads `conf/.env.<scope>` when CAPSULE_SCOPE is set, plain `.env` otherwise
pub fn load_env_files() -> Result<EnvSource> {
    let scope = std::env::var("CAPSULE_SCOPE").ok();
    load_env_files_from(ENV_FOLDER, scope.as_deref())
}

fn load_env_files_from(folder: &str, scope: Option<&str>) -> Result<EnvSource> {
    match scope {
        Some(scope) => {
            if !SCOPES.contains(&scope) {
                return Err(Error::Config(format!(
                    "CAPSULE_SCOPE must be one of {:?}, got '{}'",
                    SCOPES, scope
                )));
            }
            let path = format!("{}/.env.{}", folder, scope);
            dotenvy::from_filename(&path)
                .map_err(|e| Error::Config(format!("Failed to load {}: {}", path, e)))?;
            Ok(EnvSource::Scoped(path))
        }
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(EnvSource::DotEnv),
            Err(_) => Ok(EnvSource::System),
        },
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
    }
}
