//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, SessionResponse, SessionSummary,
    SessionWithMessagesResponse, TurnView,
};
use super::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Local, Timelike};
use rand::seq::SliceRandom;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // The chat page
        .route("/", get(serve_chat_page))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        // One chat turn, processed synchronously
        .route("/api/sessions/:id/chat", post(send_chat))
        // Treatment-plan download, once the assessment is complete
        .route("/api/sessions/:id/plan", get(download_plan))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn serve_chat_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI assets missing from build</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let id = uuid::Uuid::new_v4().to_string();
    let slug = generate_slug();

    let session = state.create_session(id, slug).await;
    let session = session.lock().await;
    tracing::info!(session = %session.id, slug = %session.slug, "Session created");

    Json(SessionResponse {
        session: SessionSummary::of(&session),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionWithMessagesResponse>, AppError> {
    let session = state
        .session(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;
    let session = session.lock().await;

    let messages = session
        .state
        .history
        .iter()
        .map(|turn| TurnView {
            role: turn.role.title(),
            text: turn.text.clone(),
            step: turn.step,
        })
        .collect();

    Ok(Json(SessionWithMessagesResponse {
        session: SessionSummary::of(&session),
        messages,
    }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .session(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;
    let mut session = session.lock().await;

    session.reset();
    tracing::info!(session = %session.id, "Session reset");

    Ok(Json(SessionResponse {
        session: SessionSummary::of(&session),
    }))
}

// ============================================================
// Chat
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    let session = state
        .session(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;

    // The session mutex is held across the crew call: one message is
    // processed to completion before the next is accepted.
    let mut session = session.lock().await;
    let reply = session.process_message(&req.text).await;

    Ok(Json(ChatResponse {
        reply,
        session: SessionSummary::of(&session),
    }))
}

// ============================================================
// Treatment-Plan Download
// ============================================================

async fn download_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = state
        .session(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;
    let session = session.lock().await;

    let plan = session.state.treatment_plan().ok_or_else(|| {
        AppError::BadRequest("The assessment is not complete yet".to_string())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"psychological_treatment_plan.md\"",
            ),
        ],
        plan.to_string(),
    )
        .into_response())
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("compass ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Slug Generation
// ============================================================

fn generate_slug() -> String {
    let now = Local::now();

    let day = match now.weekday() {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    };

    let time = match now.hour() {
        6..=11 => "morning",
        12..=16 => "afternoon",
        17..=20 => "evening",
        _ => "night",
    };

    let words = &[
        "cedar", "willow", "harbor", "meadow", "lantern", "juniper", "clover", "ember", "aspen",
        "tide", "prairie", "garnet", "linden", "brook", "heron", "slate", "maple", "fern",
        "cobalt", "wren",
    ];

    let mut rng = rand::thread_rng();
    let first = words.choose(&mut rng).unwrap_or(&"quiet");
    let second = words.choose(&mut rng).unwrap_or(&"grove");

    format!("{day}-{time}-{first}-{second}")
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
