//! HTTP API for Muster.

use crate::node::NodeState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use muster_core::{
    dispatch, Caller, Command, CommandOutcome, Email, ErrorKind, Handle, TeamSpace,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use subtle::ConstantTimeEq;

type AppState = Arc<NodeState>;

/// Header carrying the pre-shared key.
pub const API_KEY_HEADER: &str = "api-key";

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/push", post(push))
        .route("/commands", post(run_command))
        .route("/teams", get(list_teams))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        // Health (at root and under /api/v1 for compatibility)
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        .route("/ready", get(ready))
        .nest("/api/v1", protected)
        .with_state(state)
}

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

async fn ready() -> &'static str {
    "OK"
}

// --- Authentication ---

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let authorized = match (state.api_key.as_deref(), presented) {
        (Some(expected), Some(presented)) => constant_time_eq(presented, expected),
        _ => false,
    };

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!("Rejected API request to {} without a valid key", request.uri().path());
        (StatusCode::UNAUTHORIZED, Json(json!({ "success": false }))).into_response()
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

// --- Registration push ---

#[derive(Debug, Deserialize)]
struct PushRequest {
    email: String,
    #[serde(alias = "externalHandle")]
    tag: String,
}

/// Record one registrant. Answers with the submitted body plus `success`.
async fn push(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let req: PushRequest = serde_json::from_value(body.clone())
        .map_err(|e| failure(StatusCode::BAD_REQUEST, &format!("invalid push body: {}", e)))?;

    let email = Email::new(&req.email);
    let handle = Handle::new(req.tag.trim());
    if email.is_empty() || handle.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "email and tag are required"));
    }

    state
        .engine
        .upsert_registrant(email, handle)
        .await
        .map_err(|e| {
            let reason = match e.rejection() {
                Some(rejection) => rejection.code(),
                None => "storage unavailable, retry later",
            };
            failure(status_for(e.kind()), reason)
        })?;

    let mut echo = body;
    if let Value::Object(fields) = &mut echo {
        fields.insert("success".to_string(), Value::Bool(true));
    }
    Ok(Json(echo))
}

fn failure(status: StatusCode, reason: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "success": false, "error": reason })))
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict | ErrorKind::Capacity => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Persistence => StatusCode::SERVICE_UNAVAILABLE,
    }
}

// --- Chat commands ---

#[derive(Debug, Deserialize)]
struct CommandRequest {
    caller: Caller,
    #[serde(flatten)]
    command: Command,
}

async fn run_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Json<CommandOutcome> {
    Json(dispatch(&state.engine, &req.caller, req.command).await)
}

// --- Teams ---

/// Team listing entry. Never includes emails.
#[derive(Debug, Serialize)]
struct TeamSummary {
    name: String,
    number: u64,
    members: Vec<String>,
    space: TeamSpace,
}

async fn list_teams(State(state): State<AppState>) -> Json<Vec<TeamSummary>> {
    let teams = state
        .engine
        .teams()
        .await
        .iter()
        .map(|team| TeamSummary {
            name: team.name.to_string(),
            number: team.sequence,
            members: team.members.iter().map(|m| m.to_string()).collect(),
            space: TeamSpace::for_team(team),
        })
        .collect();
    Json(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster_csv::RosterColumns;
    use axum::body::Body;
    use axum::http::Request;
    use muster_core::{EngineConfig, FormationEngine, MemoryPersistence, UserId};
    use tower::ServiceExt;

    fn state_with(persistence: Arc<MemoryPersistence>, api_key: Option<&str>) -> AppState {
        Arc::new(NodeState {
            engine: Arc::new(FormationEngine::new(EngineConfig::default(), persistence).unwrap()),
            api_key: api_key.map(str::to_string),
            roster_columns: RosterColumns::default(),
        })
    }

    fn state() -> AppState {
        state_with(Arc::new(MemoryPersistence::new()), Some("secret"))
    }

    fn post_json(uri: &str, key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_needs_no_key() {
        let response = build_router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn push_echoes_body_and_lowercases_email() {
        let state = state();
        let body = json!({ "email": "Alice@Example.com", "tag": "alice#0001" });
        let (status, value) = send(&state, post_json("/api/v1/push", Some("secret"), body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({ "email": "Alice@Example.com", "tag": "alice#0001", "success": true })
        );
        let record = state
            .engine
            .lookup_registrant(&Email::new("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(record.email.as_str(), "alice@example.com");
    }

    #[tokio::test]
    async fn push_accepts_external_handle_field() {
        let state = state();
        let body = json!({ "email": "a@x.com", "externalHandle": "a#1" });
        let (status, _) = send(&state, post_json("/api/v1/push", Some("secret"), body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.engine.registrant_count().await, 1);
    }

    #[tokio::test]
    async fn push_rejects_bad_or_missing_key() {
        let state = state();
        let body = json!({ "email": "a@x.com", "tag": "a#1" });

        let (status, value) = send(&state, post_json("/api/v1/push", Some("wrong"), body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(value, json!({ "success": false }));

        let (status, _) = send(&state, post_json("/api/v1/push", None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(state.engine.registrant_count().await, 0);
    }

    #[tokio::test]
    async fn unset_key_refuses_everything() {
        let state = state_with(Arc::new(MemoryPersistence::new()), None);
        let body = json!({ "email": "a@x.com", "tag": "a#1" });
        let (status, _) = send(&state, post_json("/api/v1/push", Some(""), body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn push_is_idempotent() {
        let persistence = Arc::new(MemoryPersistence::new());
        let state = state_with(persistence.clone(), Some("secret"));
        let body = json!({ "email": "a@x.com", "tag": "a#1" });

        for _ in 0..2 {
            let (status, _) = send(&state, post_json("/api/v1/push", Some("secret"), body.clone())).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(persistence.writes(), 1);
    }

    #[tokio::test]
    async fn push_validation_and_conflicts() {
        let state = state();

        let (status, _) = send(
            &state,
            post_json("/api/v1/push", Some("secret"), json!({ "email": " ", "tag": "a#1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            post_json("/api/v1/push", Some("secret"), json!({ "email": "a@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(
            &state,
            post_json("/api/v1/push", Some("secret"), json!({ "email": "a@x.com", "tag": "a#1" })),
        )
        .await;
        let (status, value) = send(
            &state,
            post_json("/api/v1/push", Some("secret"), json!({ "email": "b@x.com", "tag": "a#1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(value["success"], false);
    }

    #[tokio::test]
    async fn push_reports_storage_failure_as_unavailable() {
        let persistence = Arc::new(MemoryPersistence::new());
        let state = state_with(persistence.clone(), Some("secret"));
        persistence.fail_writes(true);

        let body = json!({ "email": "a@x.com", "tag": "a#1" });
        let (status, _) = send(&state, post_json("/api/v1/push", Some("secret"), body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.engine.registrant_count().await, 0);
    }

    #[tokio::test]
    async fn commands_drive_the_engine() {
        let state = state();
        state
            .engine
            .upsert_registrant(Email::new("a@x.com"), Handle::new("a#1"))
            .await
            .unwrap();

        let verify = json!({
            "caller": { "user": "1", "handle": "a#1" },
            "command": "verify",
            "email": "A@x.com",
        });
        let (status, value) = send(&state, post_json("/api/v1/commands", Some("secret"), verify)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "success");
        assert_eq!(value["effects"][0]["effect"], "grant_role");

        let create = json!({
            "caller": { "user": "1", "handle": "a#1" },
            "command": "create_team",
            "name": "Falcons",
            "member1": "2",
        });
        let (_, value) = send(&state, post_json("/api/v1/commands", Some("secret"), create)).await;
        assert_eq!(value["status"], "member_unverified");
        assert_eq!(value["kind"], "conflict");
        assert!(!state.engine.team_exists("Falcons").await);
    }

    #[tokio::test]
    async fn teams_listing() {
        let state = state();
        state
            .engine
            .upsert_registrant(Email::new("a@x.com"), Handle::new("a#1"))
            .await
            .unwrap();
        state
            .engine
            .verify(UserId::new("1"), Handle::new("a#1"), Email::new("a@x.com"))
            .await
            .unwrap();
        state
            .engine
            .create_team(UserId::new("1"), "Byte Me", vec![])
            .await
            .unwrap();

        let request = Request::builder()
            .uri("/api/v1/teams")
            .header(API_KEY_HEADER, "secret")
            .body(Body::empty())
            .unwrap();
        let (status, value) = send(&state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value[0]["name"], "Byte Me");
        assert_eq!(value[0]["number"], 1);
        assert_eq!(value[0]["members"], json!(["1"]));
        assert_eq!(value[0]["space"]["text_channel"], "Byte-Me-text");
        assert!(!value.to_string().contains("a@x.com"));
    }
}
