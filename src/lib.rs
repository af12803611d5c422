//! Car registry agent
//!
//! Conversational front-end for a single-table vehicle registry. A caller
//! gives a VIN, the agent looks up or creates the car, and later turns are
//! answered with the resolved car as context.
//!
//! The pieces, leaves first:
//!
//! - [`registry`] - durable VIN-keyed car records
//! - [`session`] - the per-conversation "current car"
//! - [`intent`] - keyword rules turning an utterance into an intent
//! - [`dialogue`] - one call per turn tying the above together
//! - [`conversation`] and [`routes`] - the HTTP conversation driver

pub mod config;
pub mod conversation;
pub mod dialogue;
pub mod intent;
pub mod registry;
pub mod routes;
pub mod session;

pub use dialogue::{DialogueController, DialogueError};
pub use intent::{Intent, IntentClassifier, KeywordClassifier};
pub use registry::{CarRecord, NewCar, RecordStore, SqliteRecordStore, StoreError};
pub use session::SessionState;
