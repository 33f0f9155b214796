use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    CandidateFilter, EstimateInput, EstimateResult, EstimationSession, ImportError,
    ImportedTaskCandidate, ProjectSummary, SessionError, StoreError, Task,
};

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<EstimationSession>>,
}

impl AppState {
    pub fn new(session: EstimationSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }

    pub fn with_shared(session: Arc<RwLock<EstimationSession>>) -> Self {
        Self { session }
    }

    fn session(&self) -> Arc<RwLock<EstimationSession>> {
        self.session.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::TaskNotFound(_) => ApiError::NotFound(value.to_string()),
            StoreError::DataFrame(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(value: ImportError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::CandidateOutOfRange { .. } => ApiError::Invalid(value.to_string()),
            SessionError::Import(err) => err.into(),
            SessionError::Store(err) => err.into(),
            SessionError::Export(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                tracing::error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// A task together with its live estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub estimate: EstimateResult,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        let estimate = task.estimate();
        Self { task, estimate }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateTaskPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    optimistic: String,
    #[serde(default)]
    most_likely: String,
    #[serde(default)]
    pessimistic: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
struct UpdateTaskPayload {
    name: Option<String>,
    optimistic: Option<String>,
    most_likely: Option<String>,
    pessimistic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApplySelectionPayload {
    indices: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateView {
    pub index: usize,
    #[serde(flatten)]
    pub candidate: ImportedTaskCandidate,
    pub tag_list: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidateFacets {
    pub work_item_types: Vec<String>,
    pub states: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub rows_read: usize,
    pub dropped: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/summary", get(get_summary))
        .route("/import", post(import_candidates))
        .route("/candidates", get(list_candidates))
        .route("/candidates/facets", get(candidate_facets))
        .route("/candidates/apply", post(apply_candidates))
        .route("/export", get(export_tasks))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, session: EstimationSession) -> std::io::Result<()> {
    let state = AppState::new(session);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskView>>, ApiError> {
    let session = state.session();
    let tasks = {
        let guard = session.read();
        guard.tasks()?
    };
    Ok(Json(tasks.into_iter().map(TaskView::from).collect()))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<Json<TaskView>, ApiError> {
    let session = state.session();
    let result = {
        let guard = session.read();
        guard.find_task(task_id)?
    };
    match result {
        Some(task) => Ok(Json(task.into())),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    let session = state.session();
    let created = {
        let mut guard = session.write();
        let input = EstimateInput::new(payload.optimistic, payload.most_likely, payload.pessimistic);
        let id = guard.add_task(&payload.name, input)?;
        guard
            .find_task(id)?
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<Json<TaskView>, ApiError> {
    let session = state.session();
    let updated = {
        let mut guard = session.write();
        let mut task = guard
            .find_task(task_id)?
            .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))?;
        if let Some(name) = payload.name {
            task.name = name;
        }
        if let Some(value) = payload.optimistic {
            task.optimistic = value;
        }
        if let Some(value) = payload.most_likely {
            task.most_likely = value;
        }
        if let Some(value) = payload.pessimistic {
            task.pessimistic = value;
        }
        guard.update_task(&task)?;
        guard
            .find_task(task_id)?
            .ok_or_else(|| ApiError::internal("task not found after update"))?
    };
    Ok(Json(updated.into()))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let session = state.session();
    let removed = {
        let mut guard = session.write();
        guard.delete_task(task_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_summary(State(state): State<AppState>) -> Result<Json<ProjectSummary>, ApiError> {
    let session = state.session();
    let summary = {
        let guard = session.read();
        guard.summary()?
    };
    Ok(Json(summary))
}

async fn import_candidates(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let session = state.session();
    let report = {
        let mut guard = session.write();
        guard.import_candidates(body.as_ref())?
    };
    Ok(Json(ImportResponse {
        imported: report.candidates.len(),
        rows_read: report.rows_read,
        dropped: report.dropped,
    }))
}

async fn list_candidates(
    State(state): State<AppState>,
    Query(filter): Query<CandidateFilter>,
) -> Json<Vec<CandidateView>> {
    let session = state.session();
    let views = {
        let guard = session.read();
        let candidates = guard.candidates();
        guard
            .filter_candidates(&filter)
            .into_iter()
            .map(|index| {
                let candidate = candidates[index].clone();
                let tag_list = candidate.tag_list().into_iter().map(String::from).collect();
                CandidateView {
                    index,
                    candidate,
                    tag_list,
                }
            })
            .collect()
    };
    Json(views)
}

async fn candidate_facets(State(state): State<AppState>) -> Json<CandidateFacets> {
    let session = state.session();
    let (work_item_types, states) = session.read().candidate_facets();
    Json(CandidateFacets {
        work_item_types,
        states,
    })
}

async fn apply_candidates(
    State(state): State<AppState>,
    Json(payload): Json<ApplySelectionPayload>,
) -> Result<(StatusCode, Json<Vec<TaskView>>), ApiError> {
    if payload.indices.is_empty() {
        return Err(ApiError::invalid("no candidates selected"));
    }
    let session = state.session();
    let created = {
        let mut guard = session.write();
        let ids = guard.apply_selected(&payload.indices)?;
        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            let task = guard
                .find_task(id)?
                .ok_or_else(|| ApiError::internal("task not found after selection"))?;
            created.push(TaskView::from(task));
        }
        created
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn export_tasks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let session = state.session();
    let (body, file_name) = {
        let guard = session.read();
        if !guard.can_export()? {
            return Err(ApiError::Conflict(
                "add a task name before exporting".into(),
            ));
        }
        let today = chrono::Local::now().date_naive();
        (guard.export_csv()?, guard.export_file_name(today))
    };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
