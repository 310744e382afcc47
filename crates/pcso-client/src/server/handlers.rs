use axum::{Json, extract::State, http::StatusCode};

use super::types::{ApiResult, HealthResponse, RouterState, UpdateDataResponse, failed, updated};

pub(super) async fn health() -> ApiResult<HealthResponse> {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Run fetch then import on a separate task, bounded by the trigger budget
pub(super) async fn update_data(State(state): State<RouterState>) -> ApiResult<UpdateDataResponse> {
    let budget = state.pipeline.config().http.trigger_timeout();
    let pipeline = state.pipeline.clone();

    log::info!("Update triggered over HTTP");
    let run = tokio::spawn(async move { pipeline.run_update().await });
    let abort = run.abort_handle();

    match tokio::time::timeout(budget, run).await {
        Ok(Ok(Ok(outcome))) => {
            log::info!("Update finished: {} records", outcome.fetch.normalized);
            updated(&outcome, state.pipeline.store().files_created())
        }
        Ok(Ok(Err(e))) => {
            log::error!("Update failed: {e:#}");
            failed(format!("{e:#}"))
        }
        Ok(Err(e)) => {
            log::error!("Update task ended abnormally: {e}");
            failed(format!("Update task ended abnormally: {e}"))
        }
        Err(_) => {
            abort.abort();
            log::error!("Update exceeded {}s, aborted", budget.as_secs());
            failed(format!("Update timed out after {} seconds", budget.as_secs()))
        }
    }
}
