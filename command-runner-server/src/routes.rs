use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use command_runner_api::api::{Command, CREATED_MESSAGE, STOPPED_MESSAGE};

use crate::error::{parse_id, AppError};
use crate::process::Executor;
use crate::store::Store;

/// Everything a handler needs, injected once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub executor: Executor,
}

/// Routes for `/commands` and the readiness probe.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/commands", post(create_command).get(list_commands))
        .route("/commands/:id", get(get_command))
        .route("/commands/:id/stop", post(stop_command))
        .route("/ready", get(ready))
        .with_state(state)
}

async fn create_command(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content = content_field(&body, query.as_deref());
    let id = state.store.insert(&content).await?;
    log::info!(id; "created command");
    log::debug!(id; "content: {content}");
    Ok((StatusCode::CREATED, CREATED_MESSAGE))
}

/// Finds the `content` form field, whatever the declared content type.
///
/// The body wins over the query string, a missing field is empty.
fn content_field(body: &[u8], query: Option<&str>) -> String {
    let from_body = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body).ok();
    let from_query = query.and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok());
    from_body
        .into_iter()
        .chain(from_query)
        .flatten()
        .find_map(|(key, value)| (key == "content").then_some(value))
        .unwrap_or_default()
}

async fn list_commands(State(state): State<AppState>) -> Result<Json<Vec<Command>>, AppError> {
    let commands = state.store.list_all().await?;
    log::debug!(count = commands.len(); "listing commands");
    Ok(Json(commands))
}

async fn get_command(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Command>, AppError> {
    let id = parse_id(&id)?;
    let command = state.store.get_by_id(id).await?;
    Ok(Json(command))
}

/// Runs the stored command to completion and records its output.
///
/// Nothing is interrupted, the name is kept for api compatibility.
async fn stop_command(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let content = state.store.get_content(id).await?;

    log::info!(id; "running command");
    log::debug!(id; "content: {content}");
    let output = state
        .executor
        .run(&content)
        .await
        .inspect_err(|e| log::info!(id; "run failed: {e}"))?;

    state.store.update_output(id, &output).await?;
    log::info!(id, bytes = output.len(); "stored command output");
    Ok((StatusCode::OK, STOPPED_MESSAGE))
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, String::from("OK")),
        Err(e) => {
            log::warn!("readiness check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                String::from("database unavailable"),
            )
        }
    }
}
