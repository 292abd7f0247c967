//! Configuration structs

mod app_config;

pub use app_config::{
    AppSettings, AvailConfig, ChatConfig, ConfigError, EngineConfig, Environment, ServerConfig,
    StoreConfig, TablesConfig,
};
