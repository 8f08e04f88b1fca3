use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{SessionId, UserId};
use super::repository::{ContextProvider, SessionRepository};
use super::service::{AssessmentService, AssessmentServiceError, SessionView};

/// Router builder exposing the engine's HTTP endpoints.
pub fn assessment_router<R, C>(service: Arc<AssessmentService<R, C>>) -> Router
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<R, C>))
        .route(
            "/api/v1/assessments/:session_id/patient-messages",
            post(patient_turn_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:session_id/attendant-messages",
            post(attendant_turn_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:session_id/progress",
            get(progress_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:session_id/completion",
            post(completion_handler::<R, C>),
        )
        .route(
            "/api/v1/assessments/:session_id/report-gate",
            get(report_gate_handler::<R, C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartSessionRequest {
    pub(crate) user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TurnRequest {
    pub(crate) text: String,
}

fn error_response(error: AssessmentServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (error.status_code(), axum::Json(payload)).into_response()
}

pub(crate) async fn start_handler<R, C>(
    State(service): State<Arc<AssessmentService<R, C>>>,
    axum::Json(request): axum::Json<StartSessionRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    match service.start_session(UserId(request.user_id)) {
        Ok(session) => {
            let view = SessionView::from(&session);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn patient_turn_handler<R, C>(
    State(service): State<Arc<AssessmentService<R, C>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<TurnRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    let id = SessionId(session_id);
    match service.append_patient_turn(&id, request.text) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attendant_turn_handler<R, C>(
    State(service): State<Arc<AssessmentService<R, C>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<TurnRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    let id = SessionId(session_id);
    match service.append_attendant_turn(&id, request.text) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn progress_handler<R, C>(
    State(service): State<Arc<AssessmentService<R, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    let id = SessionId(session_id);
    match service.progress(&id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn completion_handler<R, C>(
    State(service): State<Arc<AssessmentService<R, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    let id = SessionId(session_id);
    match service.request_manual_completion(&id) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_gate_handler<R, C>(
    State(service): State<Arc<AssessmentService<R, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    C: ContextProvider + 'static,
{
    let id = SessionId(session_id);
    match service.report_gate(&id) {
        Ok(gate) => (StatusCode::OK, axum::Json(gate)).into_response(),
        Err(error) => error_response(error),
    }
}
