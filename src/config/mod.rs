//! Application configuration

pub mod prompts;

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use prompts::{builtin as prompts_builtin, AgentProfile, ConfigError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the car registry
    pub db_path: PathBuf,
    /// Optional TOML file overriding the agent's name and prompts
    pub profile_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            db_path: env::var("AUTO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("auto_db.sqlite")),
            profile_path: env::var("AGENT_PROFILE").ok().map(PathBuf::from),
        })
    }

    /// Load the agent profile, falling back to the built-in texts
    pub fn load_profile(&self) -> Result<AgentProfile, ConfigError> {
        match &self.profile_path {
            Some(path) => AgentProfile::from_file(path),
            None => Ok(AgentProfile::default()),
        }
    }
}
