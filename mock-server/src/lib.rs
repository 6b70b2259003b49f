use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::warn;

pub const DEFAULT_TOKEN: &str = "secret-token";

#[derive(Debug, Clone)]
pub struct ServerState {
    /// The only bearer token the server accepts.
    pub token: String,
    pub assignments: Vec<Value>,
    pub student: Map<String, Value>,
    /// Every bearer token presented, accepted or not, in arrival order.
    pub seen_tokens: Vec<String>,
}

impl ServerState {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            assignments: Vec::new(),
            student: Map::new(),
            seen_tokens: Vec::new(),
        }
    }

    /// A state pre-filled with one student and two assignments.
    pub fn seeded(token: &str) -> Self {
        let student = json!({
            "code": "1558739",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "github_user": "ada"
        });
        Self {
            assignments: vec![
                json!({"id": 1, "title": "Primer parcial", "description": "Paradigma funcional", "grades": []}),
                json!({"id": 2, "title": "TP integrador", "description": "Objetos", "grades": [{"id": 1, "value": 8}]}),
            ],
            student: student.as_object().cloned().unwrap_or_default(),
            ..Self::new(token)
        }
    }
}

pub type SharedState = Arc<RwLock<ServerState>>;

#[derive(Serialize)]
struct AssignmentsBody {
    items: Vec<Value>,
}

pub fn app() -> Router {
    app_with_state(Arc::new(RwLock::new(ServerState::seeded(DEFAULT_TOKEN))))
}

pub fn app_with_state(state: SharedState) -> Router {
    Router::new()
        .route("/assignments", get(list_assignments))
        .route("/student", get(get_student).put(update_student))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: SharedState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

/// Records the presented token and checks it against the expected one.
fn authorize(state: &mut ServerState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) => {
            state.seen_tokens.push(token.to_string());
            if token == state.token {
                Ok(())
            } else {
                warn!(token, "rejected bearer token");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
        None => {
            warn!("missing bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn list_assignments(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<AssignmentsBody>, StatusCode> {
    let mut state = state.write().await;
    authorize(&mut state, &headers)?;
    Ok(Json(AssignmentsBody {
        items: state.assignments.clone(),
    }))
}

async fn get_student(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    let mut state = state.write().await;
    authorize(&mut state, &headers)?;
    Ok(Json(state.student.clone()))
}

/// The body is parsed only after the token check, so a bad token is a 401
/// whatever the payload.
async fn update_student(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    let mut state = state.write().await;
    authorize(&mut state, &headers)?;
    let profile: Map<String, Value> =
        serde_json::from_slice(&body).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    state.student = profile;
    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn authorize_accepts_matching_token() {
        let mut state = ServerState::new("tok");
        assert!(authorize(&mut state, &bearer("tok")).is_ok());
        assert_eq!(state.seen_tokens, vec!["tok".to_string()]);
    }

    #[test]
    fn authorize_rejects_and_records_wrong_token() {
        let mut state = ServerState::new("tok");
        assert_eq!(authorize(&mut state, &bearer("nope")), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(state.seen_tokens, vec!["nope".to_string()]);
    }

    #[test]
    fn authorize_rejects_missing_header() {
        let mut state = ServerState::new("tok");
        assert_eq!(authorize(&mut state, &HeaderMap::new()), Err(StatusCode::UNAUTHORIZED));
        assert!(state.seen_tokens.is_empty());
    }

    #[test]
    fn authorize_requires_bearer_scheme() {
        let mut state = ServerState::new("tok");
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic tok".parse().unwrap());
        assert_eq!(authorize(&mut state, &headers), Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn assignments_body_serializes_under_items() {
        let body = AssignmentsBody { items: Vec::new() };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"items": []}));
    }

    #[test]
    fn seeded_state_has_student_and_assignments() {
        let state = ServerState::seeded("tok");
        assert_eq!(state.assignments.len(), 2);
        assert_eq!(state.student["first_name"], "Ada");
    }
}
