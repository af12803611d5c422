//! API routes
//!
//! The HTTP conversation driver. Each conversation gets its own session;
//! every posted message is one call into the dialogue controller.

mod error;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{prompts_builtin, AgentProfile};
use crate::conversation::ConversationRegistry;
use crate::dialogue::DialogueController;

pub use error::{ApiError, ErrorBody};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<AgentProfile>,
    pub controller: Arc<DialogueController>,
    pub conversations: Arc<ConversationRegistry>,
}

impl AppState {
    pub fn new(profile: AgentProfile, controller: DialogueController) -> Self {
        Self {
            profile: Arc::new(profile),
            controller: Arc::new(controller),
            conversations: Arc::new(ConversationRegistry::new()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    pub name: String,
    pub instructions: String,
    pub welcome: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub conversation_id: Uuid,
    pub message: String,
    pub resolved: bool,
    /// Extra guidance for the reply generator while no car is resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn agent(State(state): State<AppState>) -> Json<AgentResponse> {
    let prompts = &state.profile.agent;
    Json(AgentResponse {
        name: prompts.name.clone(),
        instructions: prompts.instructions.clone(),
        welcome: prompts.welcome.clone(),
    })
}

async fn start_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    let conversation_id = state.conversations.start().await;
    Json(ConversationResponse {
        conversation_id,
        message: state.profile.agent.welcome.clone(),
    })
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let conversation = state
        .conversations
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Conversation not found: {}", id)))?;

    // held for the whole turn so a conversation never processes two at once
    let mut conversation = conversation.lock().await;

    let message = state
        .controller
        .handle_utterance(&mut conversation.session, &request.text)
        .await?;

    let resolved = conversation.session.is_resolved();
    let guidance = (!resolved).then(|| prompts_builtin::lookup_vin_message(&request.text));

    Ok(Json(MessageResponse {
        conversation_id: id,
        message,
        resolved,
        guidance,
    }))
}

async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let conversation = state
        .conversations
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Conversation not found: {}", id)))?;

    conversation.lock().await.restart();

    Ok(Json(ConversationResponse {
        conversation_id: id,
        message: state.profile.agent.welcome.clone(),
    }))
}

async fn end_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.conversations.end(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Conversation not found: {}", id)))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/agent", get(agent))
        .route("/v1/conversations", post(start_conversation))
        .route("/v1/conversations/:id", delete(end_conversation))
        .route("/v1/conversations/:id/messages", post(send_message))
        .route("/v1/conversations/:id/reset", post(reset_conversation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::registry::{CarRecord, NewCar, RecordStore, SqliteRecordStore, StoreError};

    const VIN: &str = "1HGCM82633A004352";

    struct UnavailableStore;

    #[async_trait]
    impl RecordStore for UnavailableStore {
        async fn create(&self, _car: NewCar) -> Result<CarRecord, StoreError> {
            Err(StoreError::Storage(sqlx::Error::PoolClosed))
        }

        async fn lookup(&self, _vin: &str) -> Result<Option<CarRecord>, StoreError> {
            Err(StoreError::Storage(sqlx::Error::PoolClosed))
        }
    }

    async fn make_state() -> AppState {
        let store = Arc::new(SqliteRecordStore::open_in_memory().await.unwrap());
        AppState::new(AgentProfile::default(), DialogueController::new(store))
    }

    async fn start(app: &Router) -> Uuid {
        let resp = app
            .clone()
            .oneshot(
                Request::post("/v1/conversations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let started: ConversationResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(started.message, prompts_builtin::WELCOME_MESSAGE);
        started.conversation_id
    }

    async fn say(app: &Router, id: Uuid, text: &str) -> (StatusCode, Vec<u8>) {
        let resp = app
            .clone()
            .oneshot(
                Request::post(format!("/v1/conversations/{}/messages", id))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&MessageRequest {
                            text: text.to_string(),
                        })
                        .unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router().with_state(make_state().await);
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_agent_endpoint() {
        let app = router().with_state(make_state().await);
        let resp = app
            .oneshot(Request::get("/v1/agent").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let agent: AgentResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(agent.instructions, prompts_builtin::INSTRUCTIONS);
        assert_eq!(agent.welcome, prompts_builtin::WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn test_create_then_query_over_http() {
        let app = router().with_state(make_state().await);
        let id = start(&app).await;

        let (status, body) = say(&app, id, "lookup vin 1HGCM82633A004352").await;
        assert_eq!(status, StatusCode::OK);
        let reply: MessageResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply.message, "Car not found");
        assert!(!reply.resolved);
        assert!(reply.guidance.is_some());

        let (_, body) = say(
            &app,
            id,
            &format!("create profile {} Honda Accord 2003", VIN),
        )
        .await;
        let reply: MessageResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply.message, "Car profile created!");
        assert!(reply.resolved);
        assert!(reply.guidance.is_none());

        let (_, body) = say(&app, id, "what can you tell me about this car").await;
        let reply: MessageResponse = serde_json::from_slice(&body).unwrap();
        assert!(reply.message.contains("make: Honda"));
    }

    #[tokio::test]
    async fn test_reset_clears_resolved_car() {
        let state = make_state().await;
        let app = router().with_state(state.clone());
        let id = start(&app).await;

        say(&app, id, &format!("create profile {} Honda Accord 2003", VIN)).await;

        let resp = app
            .clone()
            .oneshot(
                Request::post(format!("/v1/conversations/{}/reset", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let conversation = state.conversations.get(&id).await.unwrap();
        assert!(!conversation.lock().await.session.is_resolved());
    }

    #[tokio::test]
    async fn test_unknown_conversation() {
        let app = router().with_state(make_state().await);
        let (status, body) = say(&app, Uuid::new_v4(), "hello").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "not_found");
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let app = router().with_state(make_state().await);
        let id = start(&app).await;

        let (status, _) = say(&app, id, "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_end_conversation() {
        let app = router().with_state(make_state().await);
        let id = start(&app).await;

        let end = |app: Router| async move {
            app.oneshot(
                Request::delete(format!("/v1/conversations/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
        };

        assert_eq!(end(app.clone()).await, StatusCode::NO_CONTENT);
        assert_eq!(end(app.clone()).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let state = AppState::new(
            AgentProfile::default(),
            DialogueController::new(Arc::new(UnavailableStore)),
        );
        let app = router().with_state(state);
        let id = start(&app).await;

        let (status, body) = say(&app, id, "lookup vin ABC").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.error, "internal_error");
    }
}
