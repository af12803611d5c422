//! Agent prompt profile
//!
//! The texts handed to the reply-generation side of the agent: the system
//! instructions and the welcome prompt spoken when a conversation starts.
//! Both default to the built-in texts and can be overridden from TOML.
//!
//! # Example Profile File
//!
//! ```toml
//! [agent]
//! name = "Downtown Service Desk"
//! welcome = "Hi! Tell me your VIN, or say 'create profile'."
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Agent identity and prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentProfile {
    #[serde(default)]
    pub agent: AgentPrompts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPrompts {
    /// Display name of the agent
    #[serde(default = "default_name")]
    pub name: String,

    /// System instructions for the language model
    #[serde(default = "default_instructions")]
    pub instructions: String,

    /// Prompt shown once at the start of each conversation
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

fn default_name() -> String {
    builtin::AGENT_NAME.to_string()
}

fn default_instructions() -> String {
    builtin::INSTRUCTIONS.to_string()
}

fn default_welcome() -> String {
    builtin::WELCOME_MESSAGE.to_string()
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            name: default_name(),
            instructions: default_instructions(),
            welcome: default_welcome(),
        }
    }
}

impl AgentProfile {
    /// Load a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a profile from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let profile: AgentProfile = toml::from_str(content)?;
        if profile.agent.welcome.trim().is_empty() {
            return Err(ConfigError::Validation(
                "agent.welcome must not be empty".to_string(),
            ));
        }
        Ok(profile)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Built-in texts that don't require files
pub mod builtin {
    pub const AGENT_NAME: &str = "Auto Service Center";

    pub const INSTRUCTIONS: &str = r#"
You are the manager of a call center speaking to a customer. Your goal is to help answer their questions or direct them to the correct department.
Start by collecting or looking up their car information. Once you have the car information, you can answer their questions or direct them appropriately.
"#;

    pub const WELCOME_MESSAGE: &str = r#"
Welcome to the Auto Service Center! Please provide the VIN of your vehicle to lookup your profile. If you don't have a profile, please say 'create profile'.
"#;

    /// Per-turn guidance for the language model while no car is resolved
    pub fn lookup_vin_message(msg: &str) -> String {
        format!(
            "If the user has provided a VIN, attempt to look it up.\n\
             If the VIN does not exist, create the entry in the database using your tools.\n\
             If the user doesn't have a VIN, ask them for details required to create a new car.\n\
             User message: {}\n",
            msg
        )
    }
}
