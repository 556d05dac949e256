use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::store::{FileStore, KeyValueStore, MemoryStore};

pub const ENV_SESSION_FILE: &str = "SERVICEHUB_SESSION_FILE";
pub const ENV_LATENCY_MS: &str = "SERVICEHUB_LATENCY_MS";
pub const ENV_CHANNEL_BUFFER: &str = "SERVICEHUB_CHANNEL_BUFFER";
pub const ENV_DEMO_ACCOUNTS: &str = "SERVICEHUB_DEMO_ACCOUNTS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where the session is persisted; `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
    /// Simulated network delay for sign-in, sign-up and request submission.
    pub latency: Duration,
    /// Mailbox capacity of each service.
    pub channel_buffer: usize,
    pub demo_accounts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_file: None,
            latency: Duration::from_millis(1000),
            channel_buffer: 100,
            demo_accounts: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any variable source. Values that fail to parse
    /// fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let session_file = lookup(ENV_SESSION_FILE)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let latency = parse_or(&lookup, ENV_LATENCY_MS, defaults.latency.as_millis() as u64);
        let channel_buffer = parse_or(&lookup, ENV_CHANNEL_BUFFER, defaults.channel_buffer).max(1);
        let demo_accounts = parse_or(&lookup, ENV_DEMO_ACCOUNTS, defaults.demo_accounts);

        Self {
            session_file,
            latency: Duration::from_millis(latency),
            channel_buffer,
            demo_accounts,
        }
    }

    pub fn session_store(&self) -> Box<dyn KeyValueStore> {
        match &self.session_file {
            Some(path) => Box::new(FileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        }
    }
}

fn parse_or<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparseable setting");
            default
        }),
    }
}
