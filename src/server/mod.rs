// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP JSON surface over the workspace.
//!
//! One route per tab/document operation; the workspace lives behind a mutex
//! shared by all handlers. Wire DTOs live in [`types`].

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::model::ids::DocumentId;
use crate::ops::ApplyError;
use crate::render::{render_request, RenderFormat};
use crate::store::{DirStore, StoreError};
use crate::workspace::{Workspace, WorkspaceError};

use types::*;

pub type SharedWorkspace = Arc<Mutex<Workspace<DirStore>>>;

#[derive(Clone)]
struct AppState {
    workspace: SharedWorkspace,
    render_base_url: Arc<str>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    violations: Option<Vec<ViolationJson>>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            violations: None,
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<ViolationJson>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            violations: self.violations,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<WorkspaceError> for ApiError {
    fn from(err: WorkspaceError) -> Self {
        let status = match &err {
            WorkspaceError::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
            WorkspaceError::AlreadyOpen { .. }
            | WorkspaceError::ReadOnly { .. }
            | WorkspaceError::ConflictDetected { .. }
            | WorkspaceError::NoConflict { .. }
            | WorkspaceError::UnsavedChanges { .. }
            | WorkspaceError::NotSaving { .. } => StatusCode::CONFLICT,
            WorkspaceError::NotADiagram { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkspaceError::ValidationFailed { violations } => {
                return Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    message: err.to_string(),
                    violations: Some(violations.iter().map(violation_json).collect()),
                };
            }
            WorkspaceError::Apply(ApplyError::Conflict { .. }) => StatusCode::CONFLICT,
            WorkspaceError::Apply(ApplyError::Graph(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            WorkspaceError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            WorkspaceError::Store(StoreError::InvalidPath { .. }) => StatusCode::BAD_REQUEST,
            WorkspaceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

/// Build the API router over a shared workspace.
pub fn router(workspace: SharedWorkspace, render_base_url: &str) -> Router {
    let state = AppState {
        workspace,
        render_base_url: Arc::from(render_base_url),
    };
    Router::new()
        .route("/documents", get(list_documents))
        .route("/documents/open", post(open_document))
        .route("/documents/{id}", get(get_document))
        .route("/documents/{id}/edit", post(edit_document))
        .route("/documents/{id}/save", post(save_document))
        .route("/documents/{id}/close", post(close_document))
        .route("/documents/{id}/resolve", post(resolve_document))
        .route("/documents/{id}/violations", get(get_violations))
        .route("/documents/{id}/conflict", get(get_conflict))
        .route("/render/{id}", get(get_render))
        .with_state(state)
}

fn parse_document_id(raw: &str) -> Result<DocumentId, ApiError> {
    DocumentId::new(raw)
        .map_err(|err| ApiError::bad_request(format!("invalid document id {raw:?}: {err}")))
}

async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<ListDocumentsResponse>, ApiError> {
    let workspace = state.workspace.lock().await;
    let documents = workspace
        .documents()
        .into_iter()
        .map(document_summary)
        .collect();
    Ok(Json(ListDocumentsResponse { documents }))
}

async fn open_document(
    State(state): State<AppState>,
    Json(params): Json<OpenDocumentParams>,
) -> Result<Json<DocumentDetail>, ApiError> {
    let mut workspace = state.workspace.lock().await;
    let document_id = if params.create.unwrap_or(false) {
        workspace.create(&params.path).await?
    } else {
        workspace.open(&params.path).await?
    };
    let document = workspace
        .document(&document_id)
        .ok_or_else(|| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "document vanished"))?;
    Ok(Json(document_detail(document)))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetail>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let workspace = state.workspace.lock().await;
    let document = workspace
        .document(&document_id)
        .ok_or(WorkspaceError::DocumentNotFound { document_id })?;
    Ok(Json(document_detail(document)))
}

async fn edit_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(params): Json<EditParams>,
) -> Result<Json<EditResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let ops = params
        .ops
        .into_iter()
        .map(ApiOp::into_graph_op)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ApiError::bad_request)?;

    let mut workspace = state.workspace.lock().await;
    let result = workspace.edit(&document_id, params.base_rev, &ops)?;
    Ok(Json(edit_response(&result)))
}

async fn save_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaveResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let mut workspace = state.workspace.lock().await;
    workspace.save(&document_id).await?;
    let document = workspace
        .document(&document_id)
        .ok_or(WorkspaceError::DocumentNotFound {
            document_id: document_id.clone(),
        })?;
    Ok(Json(SaveResponse {
        state: document_summary(document).state,
    }))
}

async fn close_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(params): Json<CloseParams>,
) -> Result<StatusCode, ApiError> {
    let document_id = parse_document_id(&id)?;
    let mut workspace = state.workspace.lock().await;
    workspace.close(&document_id, params.discard_unsaved.unwrap_or(false))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn resolve_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(params): Json<ResolveParams>,
) -> Result<Json<DocumentDetail>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let mut workspace = state.workspace.lock().await;
    workspace
        .resolve_conflict(&document_id, params.strategy.into())
        .await?;
    let document = workspace
        .document(&document_id)
        .ok_or(WorkspaceError::DocumentNotFound { document_id })?;
    Ok(Json(document_detail(document)))
}

async fn get_violations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ViolationsResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let workspace = state.workspace.lock().await;
    let violations = workspace.violations(&document_id)?;
    Ok(Json(ViolationsResponse {
        violations: violations.iter().map(violation_json).collect(),
    }))
}

async fn get_conflict(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConflictResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let workspace = state.workspace.lock().await;
    let conflict = workspace.conflict(&document_id)?;
    Ok(Json(ConflictResponse {
        conflict: conflict.map(|conflict| ConflictJson {
            external_modified_ms: conflict.external_modified_ms(),
        }),
    }))
}

async fn get_render(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<RenderResponse>, ApiError> {
    let document_id = parse_document_id(&id)?;
    let format = match query.format.as_deref() {
        None | Some("svg") => RenderFormat::Svg,
        Some("png") => RenderFormat::Png,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "invalid format {other:?} (expected svg|png)"
            )));
        }
    };

    let workspace = state.workspace.lock().await;
    let document = workspace
        .document(&document_id)
        .ok_or(WorkspaceError::DocumentNotFound {
            document_id: document_id.clone(),
        })?;
    if document.diagram().is_none() {
        return Err(WorkspaceError::NotADiagram { document_id }.into());
    }
    let request = render_request(&state.render_base_url, format, document.text());
    Ok(Json(request.into()))
}
