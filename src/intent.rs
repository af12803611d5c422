//! Utterance classification
//!
//! Maps free text to one of a closed set of intents using fixed keyword and
//! positional rules. Rules are tried in order and the first match wins:
//!
//! 1. `lookup` + `vin`        -> [`Intent::Lookup`] / [`Intent::MalformedLookup`]
//! 2. `create profile`        -> [`Intent::Create`] / [`Intent::MalformedCreate`]
//! 3. a car is already resolved -> [`Intent::Query`]
//! 4. anything else            -> [`Intent::Unknown`]

use serde::{Deserialize, Serialize};

use crate::registry::NewCar;

pub const LOOKUP_RETRY_PROMPT: &str = "Please provide a VIN after the word 'vin' to look up.";

pub const CREATE_RETRY_PROMPT: &str =
    "To create a profile, please say: create profile VIN MAKE MODEL YEAR";

/// The classified purpose of a single utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Lookup { vin: String },
    MalformedLookup,
    Create(NewCar),
    MalformedCreate,
    Query,
    Unknown,
}

impl Intent {
    /// Prompt asking the user to re-issue a malformed command
    pub fn retry_prompt(&self) -> Option<&'static str> {
        match self {
            Intent::MalformedLookup => Some(LOOKUP_RETRY_PROMPT),
            Intent::MalformedCreate => Some(CREATE_RETRY_PROMPT),
            _ => None,
        }
    }
}

/// Turns an utterance into an [`Intent`]
///
/// `resolved` tells the classifier whether the conversation already has a
/// current car, which decides between [`Intent::Query`] and
/// [`Intent::Unknown`] for utterances no command rule matches.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, utterance: &str, resolved: bool) -> Intent;
}

/// Rule-based classifier over whitespace-split tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `lookup vin <VIN>`: the VIN is the token after the first `vin`.
    fn parse_lookup(utterance: &str) -> Intent {
        let tokens: Vec<&str> = utterance.split_whitespace().collect();

        let vin = tokens
            .iter()
            .position(|token| token.to_lowercase() == "vin")
            .and_then(|index| tokens.get(index + 1));

        match vin {
            Some(vin) => Intent::Lookup {
                vin: vin.to_string(),
            },
            None => Intent::MalformedLookup,
        }
    }

    /// `create profile <VIN> <MAKE> <MODEL> <YEAR>`, positional and case-preserving.
    fn parse_create(utterance: &str) -> Intent {
        let tokens: Vec<&str> = utterance.split_whitespace().collect();
        if tokens.len() < 6 {
            return Intent::MalformedCreate;
        }

        match tokens[5].parse::<i32>() {
            Ok(year) => Intent::Create(NewCar::new(tokens[2], tokens[3], tokens[4], year)),
            Err(_) => Intent::MalformedCreate,
        }
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, utterance: &str, resolved: bool) -> Intent {
        let lowered = utterance.to_lowercase();

        if lowered.contains("lookup") && lowered.contains("vin") {
            Self::parse_lookup(utterance)
        } else if lowered.contains("create profile") {
            Self::parse_create(utterance)
        } else if resolved {
            Intent::Query
        } else {
            Intent::Unknown
        }
    }
}
