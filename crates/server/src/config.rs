use std::{env, fmt::Display, str::FromStr};

use anyhow::{Context, bail};
use tracing::info;

use crate::identity::DEFAULT_VOTER_SALT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => bail!("unknown store kind {other:?}, expected postgres or memory"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub voter_salt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            store: StoreKind::Postgres,
            database_url: None,
            max_connections: 5,
            voter_salt: DEFAULT_VOTER_SALT.into(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            host: lookup("FEEDBACK_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "FEEDBACK_PORT", defaults.port)?,
            store: parse_or(&lookup, "FEEDBACK_STORE", defaults.store)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            voter_salt: lookup("FEEDBACK_VOTER_SALT")
                .filter(|salt| !salt.is_empty())
                .unwrap_or(defaults.voter_salt),
        };

        if config.store == StoreKind::Postgres && config.database_url.is_none() {
            bail!("DATABASE_URL must be set (or FEEDBACK_STORE=memory for local runs)");
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid {key} value {raw:?}")),
        None => {
            info!("{key} not set, using default");
            Ok(default)
        }
    }
}
