use serde::{Deserialize, Serialize};

pub const DEFAULT_QUEUE_KEY: &str = "hytani_offline_queue";
pub const DEFAULT_TEMP_ID_THRESHOLD: i64 = 1_000_000_000_000;
pub const DEFAULT_TEMP_ID_PREFIX: &str = "tmp-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub queue_key: String,
    pub auto_sync: bool,
    pub sync_interval: u64,
    pub discard_rejected: bool,
    pub temp_id_threshold: i64,
    pub temp_id_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/hytani.db".to_string(),
                max_connections: 5,
            },
            remote: RemoteConfig {
                base_url: String::new(),
                api_key: String::new(),
                table: "farms".to_string(),
                timeout_secs: 15,
            },
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
            auto_sync: true,
            sync_interval: 300, // 5 minutes
            discard_rejected: false,
            temp_id_threshold: DEFAULT_TEMP_ID_THRESHOLD,
            temp_id_prefix: DEFAULT_TEMP_ID_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("HYTANI_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) = env_parsed::<u32>("HYTANI_DATABASE_MAX_CONNECTIONS") {
            cfg.database.max_connections = value;
        }

        if let Ok(v) = std::env::var("HYTANI_REMOTE_URL") {
            cfg.remote.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Ok(v) = std::env::var("HYTANI_REMOTE_API_KEY") {
            cfg.remote.api_key = v.trim().to_string();
        }
        if let Ok(v) = std::env::var("HYTANI_REMOTE_TABLE") {
            if !v.trim().is_empty() {
                cfg.remote.table = v.trim().to_string();
            }
        }
        if let Some(value) = env_parsed::<u64>("HYTANI_REMOTE_TIMEOUT_SECS") {
            cfg.remote.timeout_secs = value.max(1);
        }

        if let Ok(v) = std::env::var("HYTANI_SYNC_QUEUE_KEY") {
            if !v.trim().is_empty() {
                cfg.sync.queue_key = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("HYTANI_SYNC_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(value) = env_parsed::<u64>("HYTANI_SYNC_INTERVAL_SECS") {
            cfg.sync.sync_interval = value.max(1);
        }
        if let Ok(v) = std::env::var("HYTANI_SYNC_DISCARD_REJECTED") {
            cfg.sync.discard_rejected = parse_bool(&v, cfg.sync.discard_rejected);
        }
        if let Some(value) = env_parsed::<i64>("HYTANI_SYNC_TEMP_ID_THRESHOLD") {
            cfg.sync.temp_id_threshold = value;
        }
        if let Ok(v) = std::env::var("HYTANI_SYNC_TEMP_ID_PREFIX") {
            cfg.sync.temp_id_prefix = v.trim().to_string();
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.remote.base_url.is_empty() {
            return Err("Remote base_url must be set".to_string());
        }
        if !self.remote.base_url.starts_with("http://")
            && !self.remote.base_url.starts_with("https://")
        {
            return Err("Remote base_url must be an http(s) URL".to_string());
        }
        if self.remote.table.trim().is_empty() {
            return Err("Remote table must not be empty".to_string());
        }
        if self.remote.timeout_secs == 0 {
            return Err("Remote timeout_secs must be greater than 0".to_string());
        }
        if self.sync.queue_key.trim().is_empty() {
            return Err("Sync queue_key must not be empty".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        if self.sync.temp_id_threshold <= 0 {
            return Err("Sync temp_id_threshold must be positive".to_string());
        }
        Ok(())
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
