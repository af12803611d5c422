//! Dialogue controller
//!
//! One call per user turn: classify the utterance, act on the registry and
//! the session, and hand back the plain-text reply. The controller holds no
//! per-conversation state of its own; the caller owns the [`SessionState`]
//! and passes it in each turn.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::intent::{
    Intent, IntentClassifier, KeywordClassifier, CREATE_RETRY_PROMPT, LOOKUP_RETRY_PROMPT,
};
use crate::registry::{NewCar, RecordStore, StoreError};
use crate::session::SessionState;

pub const CAR_NOT_FOUND: &str = "Car not found";
pub const CAR_CREATED: &str = "Car profile created!";
pub const CAR_CREATE_FAILED: &str = "Failed to create car";
pub const ASK_FOR_VIN: &str = "Please provide your car's VIN to look up your profile, or say 'create profile' to register a new vehicle.";

/// Errors the controller cannot turn into a reply
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("Car registry unavailable: {0}")]
    Storage(#[source] StoreError),
}

pub struct DialogueController {
    store: Arc<dyn RecordStore>,
    classifier: Arc<dyn IntentClassifier>,
}

impl DialogueController {
    /// Create a controller using the keyword classifier
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            classifier: Arc::new(KeywordClassifier::new()),
        }
    }

    /// Swap in a different classifier
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Process one user turn and return the reply text
    pub async fn handle_utterance(
        &self,
        session: &mut SessionState,
        text: &str,
    ) -> Result<String, DialogueError> {
        let intent = self.classifier.classify(text, session.is_resolved());

        match intent {
            Intent::Lookup { vin } => self.lookup(session, &vin).await,
            Intent::Create(car) => self.create(session, car).await,
            Intent::MalformedLookup => Ok(LOOKUP_RETRY_PROMPT.to_string()),
            Intent::MalformedCreate => Ok(CREATE_RETRY_PROMPT.to_string()),
            Intent::Query if session.is_resolved() => {
                info!("get car details");
                Ok(format!("Current car:\n{}", session.describe()))
            }
            Intent::Query | Intent::Unknown => Ok(ASK_FOR_VIN.to_string()),
        }
    }

    async fn lookup(&self, session: &mut SessionState, vin: &str) -> Result<String, DialogueError> {
        info!("lookup car - vin: {}", vin);

        match self.store.lookup(vin).await {
            Ok(Some(record)) => {
                session.set_current(record);
                Ok(format!("The car details are:\n{}", session.describe()))
            }
            Ok(None) => Ok(CAR_NOT_FOUND.to_string()),
            Err(e) => {
                error!("lookup failed for vin {}: {}", vin, e);
                Err(DialogueError::Storage(e))
            }
        }
    }

    async fn create(&self, session: &mut SessionState, car: NewCar) -> Result<String, DialogueError> {
        info!(
            "create car - vin: {}, make: {}, model: {}, year: {}",
            car.vin, car.make, car.model, car.year
        );

        match self.store.create(car).await {
            Ok(record) => {
                session.set_current(record);
                Ok(CAR_CREATED.to_string())
            }
            Err(e) if e.is_recoverable() => {
                warn!("create car rejected: {}", e);
                Ok(CAR_CREATE_FAILED.to_string())
            }
            Err(e) => {
                error!("create car failed: {}", e);
                Err(DialogueError::Storage(e))
            }
        }
    }
}
