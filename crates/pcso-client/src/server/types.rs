use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, http::StatusCode};
use schemars::JsonSchema;
use serde::Serialize;

use crate::service::{Pipeline, UpdateOutcome};

#[derive(Clone)]
pub(super) struct RouterState {
    pub(super) pipeline: Arc<Pipeline>,
}

pub(super) type ApiResult<T> = (StatusCode, Json<T>);

#[derive(Serialize, JsonSchema)]
pub(super) struct HealthResponse {
    pub(super) status: &'static str,
}

/// Body of `POST /api/update-data`, both on success and failure
#[derive(Debug, Default, Serialize, JsonSchema)]
pub(super) struct UpdateDataResponse {
    pub(super) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) message: Option<String>,
    /// Artifact file name → whether it exists after the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) files_created: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) fetch_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) import_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<String>,
}

pub(super) fn updated(
    outcome: &UpdateOutcome,
    files: Vec<(String, bool)>,
) -> ApiResult<UpdateDataResponse> {
    (
        StatusCode::OK,
        Json(UpdateDataResponse {
            success: true,
            message: Some("Data updated successfully".to_owned()),
            files_created: Some(files.into_iter().collect()),
            fetch_output: Some(outcome.fetch.to_string()),
            import_output: Some(
                outcome
                    .import
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            ),
            error: None,
        }),
    )
}

pub(super) fn failed(message: impl Into<String>) -> ApiResult<UpdateDataResponse> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(UpdateDataResponse {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }),
    )
}
