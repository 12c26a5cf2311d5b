use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, StudentId};
use super::gateway::{Notifier, StudentGateway};
use super::lock::Role;
use super::service::{DashboardServiceError, StudentDashboardService, UnlockOutcome};
use super::session::ViewSession;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UnlockRequest {
    #[serde(default)]
    pub(crate) role: Role,
}

/// Router builder exposing the dashboard and unlock endpoints.
pub fn dashboard_router<G, N>(service: Arc<StudentDashboardService<G, N>>) -> Router
where
    G: StudentGateway + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/students/:student_id/dashboard",
            get(dashboard_handler::<G, N>),
        )
        .route(
            "/api/v1/students/:student_id/applications/:application_id/unlock",
            post(unlock_handler::<G, N>),
        )
        .with_state(service)
}

pub(crate) async fn dashboard_handler<G, N>(
    State(service): State<Arc<StudentDashboardService<G, N>>>,
    Path(student_id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    G: StudentGateway + 'static,
    N: Notifier + 'static,
{
    let id = StudentId(student_id);
    let role = query.role.unwrap_or_default();
    match service.dashboard(&id, role, Utc::now()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unlock_handler<G, N>(
    State(service): State<Arc<StudentDashboardService<G, N>>>,
    Path((student_id, application_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<UnlockRequest>,
) -> Response
where
    G: StudentGateway + 'static,
    N: Notifier + 'static,
{
    let student_id = StudentId(student_id);
    let application_id = ApplicationId(application_id);
    let session = ViewSession::new();

    match service.unlock(
        &session,
        &student_id,
        &application_id,
        request.role,
        Utc::now(),
    ) {
        Ok(UnlockOutcome::Refreshed(view)) => (StatusCode::OK, axum::Json(*view)).into_response(),
        Ok(UnlockOutcome::Failed { message }) => {
            let payload = json!({
                "application_id": application_id,
                "error": message,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Ok(UnlockOutcome::Discarded) => {
            let payload = json!({
                "application_id": application_id,
                "status": "discarded",
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: DashboardServiceError) -> Response {
    AppError::from(error).into_response()
}
