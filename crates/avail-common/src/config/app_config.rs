//! Application configuration structs
//!
//! Loads configuration from environment variables. Configuration is loaded
//! once at startup and immutable thereafter.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;

use avail_core::DEFAULT_SLOT_NAMES;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AvailConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub chat: ChatConfig,
    pub tables: TablesConfig,
    pub engine: EngineConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Backing tabular store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_token: String,
    /// Workbook (spreadsheet) containing all tables
    #[serde(default = "default_workbook")]
    pub workbook: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Chat service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub base_url: String,
    pub token: String,
    /// The bot's own user id; its reactions are ignored by the listener
    pub bot_user_id: i64,
    /// Channel that availability summaries are posted to, if any
    #[serde(default)]
    pub summary_channel_id: Option<i64>,
}

/// Table names: the poll index table plus one records table per league
#[derive(Debug, Clone, Deserialize)]
pub struct TablesConfig {
    #[serde(default = "default_polls_table")]
    pub polls: String,
    /// League name -> records table name
    pub leagues: BTreeMap<String, String>,
}

impl TablesConfig {
    /// Look up the records table for a league name
    #[must_use]
    pub fn records_table(&self, league: &str) -> Option<&str> {
        self.leagues.get(league).map(String::as_str)
    }

    /// League names in configuration order
    #[must_use]
    pub fn league_names(&self) -> Vec<String> {
        self.leagues.keys().cloned().collect()
    }
}

/// Engine tuning: flush cadence, journal location, index freshness
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
    #[serde(default = "default_journal_path")]
    pub journal_path: String,
    #[serde(default = "default_index_ttl")]
    pub index_ttl_secs: u64,
    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,
    /// Canonical time-slot emoji names, in display order
    #[serde(default = "default_slots")]
    pub slots: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "avail-bot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_workbook() -> String {
    "AOS".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_polls_table() -> String {
    "currentavailability".to_string()
}

fn default_flush_interval() -> u64 {
    30
}

fn default_journal_path() -> String {
    "./availability-journal.jsonl".to_string()
}

fn default_index_ttl() -> u64 {
    60
}

fn default_confirm_timeout() -> u64 {
    30
}

fn default_slots() -> Vec<String> {
    DEFAULT_SLOT_NAMES.iter().map(ToString::to_string).collect()
}

fn default_league_tables() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("HC".to_string(), "availability".to_string()),
        ("AL".to_string(), "alavailability".to_string()),
    ])
}

impl AvailConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: env::var("BOT_HOST").unwrap_or_else(|_| default_host()),
                port: env::var("BOT_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("BOT_PORT"))?,
            },
            store: StoreConfig {
                base_url: env::var("STORE_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("STORE_BASE_URL"))?,
                api_token: env::var("STORE_API_TOKEN")
                    .map_err(|_| ConfigError::MissingVar("STORE_API_TOKEN"))?,
                workbook: env::var("STORE_WORKBOOK").unwrap_or_else(|_| default_workbook()),
                max_retries: env::var("STORE_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_retries),
            },
            chat: ChatConfig {
                base_url: env::var("CHAT_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("CHAT_BASE_URL"))?,
                token: env::var("CHAT_TOKEN").map_err(|_| ConfigError::MissingVar("CHAT_TOKEN"))?,
                bot_user_id: env::var("CHAT_BOT_USER_ID")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("CHAT_BOT_USER_ID"))?,
                summary_channel_id: env::var("SUMMARY_CHANNEL_ID")
                    .ok()
                    .and_then(|s| s.parse().ok()),
            },
            tables: TablesConfig {
                polls: env::var("POLLS_TABLE").unwrap_or_else(|_| default_polls_table()),
                leagues: env::var("LEAGUE_TABLES")
                    .ok()
                    .map(|s| parse_league_tables(&s))
                    .transpose()?
                    .unwrap_or_else(default_league_tables),
            },
            engine: EngineConfig {
                flush_interval_secs: env::var("FLUSH_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_flush_interval),
                journal_path: env::var("JOURNAL_PATH").unwrap_or_else(|_| default_journal_path()),
                index_ttl_secs: env::var("INDEX_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_index_ttl),
                confirm_timeout_secs: env::var("CONFIRM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_confirm_timeout),
                slots: env::var("SLOT_EMOJI")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_ascii_uppercase)
                            .collect()
                    })
                    .unwrap_or_else(default_slots),
            },
        })
    }
}

/// Parse "HC=availability,AL=alavailability" into the league table map
fn parse_league_tables(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut map = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((league, table)) = pair.split_once('=') else {
            return Err(ConfigError::InvalidValue("LEAGUE_TABLES", raw.to_string()));
        };
        let league = league.trim().to_ascii_uppercase();
        let table = table.trim().to_string();
        if league.is_empty() || table.is_empty() {
            return Err(ConfigError::InvalidValue("LEAGUE_TABLES", raw.to_string()));
        }
        map.insert(league, table);
    }
    if map.is_empty() {
        return Err(ConfigError::InvalidValue("LEAGUE_TABLES", raw.to_string()));
    }
    Ok(map)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
