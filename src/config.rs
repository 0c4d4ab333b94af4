//! Configuration manager for usergate.
//!
//! Values come from `config.yaml` first, then environment variables (and a
//! `.env` file, if any) override them.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Configuration {
    #[serde(skip)]
    path: PathBuf,
    /// HTTP listener.
    #[serde(default)]
    pub server: Server,
    /// Related to database configuration.
    #[serde(default)]
    pub database: Database,
    /// Related to Argon2 configuration.
    pub argon2: Option<Argon2>,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 1323,
        }
    }
}

impl Server {
    /// `host:port` to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage engine backing the user table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
    /// Volatile store, for development only.
    Memory,
}

impl std::str::FromStr for Engine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Engine::Postgres),
            "mysql" => Ok(Engine::Mysql),
            "sqlite" => Ok(Engine::Sqlite),
            "memory" => Ok(Engine::Memory),
            other => Err(ConfigError::UnknownEngine(other.to_owned())),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Database {
    pub engine: Engine,
    pub host: String,
    pub port: u16,
    /// Username credential to connect.
    pub username: String,
    /// Password credential to connect.
    pub password: String,
    /// Database name. SQLite uses it as file stem.
    pub name: String,
    /// PostgreSQL `sslmode`.
    pub ssl_mode: String,
    /// Maximum pool connections.
    pub pool_size: u32,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            engine: Engine::Postgres,
            host: "localhost".into(),
            port: 5432,
            username: "postgres".into(),
            password: "postgres".into(),
            name: "test".into(),
            ssl_mode: "disable".into(),
            pool_size: 10,
        }
    }
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct Argon2 {
    /// Memory used while hashing, in KiB.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

#[cfg(test)]
impl Argon2 {
    /// Cheap parameters so tests stay fast.
    pub(crate) fn light() -> Self {
        Self {
            memory_cost: 1024,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported database engine `{0}`")]
    UnknownEngine(String),
    #[error("`{key}` is not a valid value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies environment overrides.
    pub fn read(self) -> Result<Self, ConfigError> {
        let file_path = if self.path.is_file() {
            self.path.clone()
        } else {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let mut config = match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => {
                tracing::debug!(error = %err, path = %file_path.display(), "no configuration file");
                Configuration::default()
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Override values with the variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("SERVER_PORT") {
            self.server.port = parse("SERVER_PORT", port)?;
        }

        let db = &mut self.database;
        if let Some(engine) = get("DB_TYPE") {
            db.engine = engine.parse()?;
        }
        if let Some(host) = get("DB_HOST") {
            db.host = host;
        }
        if let Some(port) = get("DB_PORT") {
            db.port = parse("DB_PORT", port)?;
        }
        if let Some(user) = get("DB_USER") {
            db.username = user;
        }
        if let Some(password) = get("DB_PASSWORD") {
            db.password = password;
        }
        if let Some(name) = get("DB_NAME") {
            db.name = name;
        }
        if let Some(ssl_mode) = get("DB_SSLMODE") {
            db.ssl_mode = ssl_mode;
        }
        if let Some(size) = get("DB_POOL_SIZE") {
            db.pool_size = parse("DB_POOL_SIZE", size)?;
        }

        Ok(())
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file is invalid");
        Self::default()
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
