use std::env;
use std::net::IpAddr;

use ::config::{Config as RawConfig, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

enum Env {
    Development,
    Test,
    Production,
}

impl Env {
    fn new() -> Self {
        match env::var("RUN_MODE") {
            Ok(ref s) if s == "test" => Env::Test,
            Ok(ref s) if s == "production" => Env::Production,
            _ => Env::Development,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Env::Development => "development",
            Env::Production => "production",
            Env::Test => "test",
        }
    }
}

/// Service configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Listen {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Database {
    pub dsn: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server listen address
    pub listen: Listen,
    /// Database settings
    pub db: Database,
}

impl Config {
    /// Creates config from base.toml, which is overwritten by <env>.toml, where
    /// env is one of development, test, production. After that it can be overwritten
    /// by env variables like STOREFRONT_LISTEN_PORT.
    pub fn new() -> Result<Self, ConfigError> {
        let env = Env::new();

        RawConfig::builder()
            .add_source(File::with_name("config/base"))
            // Optional file specific for environment
            .add_source(File::with_name(&format!("config/{}", env.as_str())).required(false))
            // Add in settings from the environment (with a prefix of STOREFRONT)
            .add_source(Environment::with_prefix("STOREFRONT").separator("_"))
            .build()?
            .try_deserialize()
    }
}
