use axum::{
    body::Bytes,
    extract::{Extension, Query, State},
    routing::{delete, get, post},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::models::{NewTag, Tag, TagUpdate};
use crate::db::services::{self, BindingOutcome};
use crate::web::envelope::ApiResponse;
use crate::web::models::tag_models::{
    validate_create, validate_delete, validate_page_binding, validate_update,
};
use crate::web::models::AuthenticatedUser;
use crate::web::{AppError, AppState};

/// Unparseable bodies validate like an empty one.
fn parse_json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

// --- Route Handlers ---

async fn list_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<ApiResponse<Vec<Tag>>, AppError> {
    let tags = app_state.tag_store.select_all_tags().await?;
    debug!(user_id = authenticated_user.id, count = tags.len(), "Listed tags.");
    Ok(ApiResponse::success(tags))
}

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ApiResponse<bool>, AppError> {
    let payload = validate_create(&parse_json_body(&body))?;

    let created = app_state
        .tag_store
        .insert_tag(NewTag {
            name: payload.name,
            color: payload.color,
        })
        .await?;
    if !created {
        warn!(user_id = authenticated_user.id, "Store did not insert tag.");
        return Err(AppError::OperationFailed("Failed to create tag"));
    }

    info!(user_id = authenticated_user.id, "Tag created.");
    Ok(ApiResponse::success(true))
}

async fn update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ApiResponse<bool>, AppError> {
    let payload = validate_update(&parse_json_body(&body))?;

    let updated = app_state
        .tag_store
        .update_tag(TagUpdate {
            id: payload.id,
            name: payload.name,
            color: payload.color,
            page_ids: None,
        })
        .await?;
    if !updated {
        warn!(user_id = authenticated_user.id, tag_id = payload.id, "Store did not update tag.");
        return Err(AppError::OperationFailed("Failed to update tag"));
    }

    info!(user_id = authenticated_user.id, tag_id = payload.id, "Tag updated.");
    Ok(ApiResponse::success(true))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<ApiResponse<bool>, AppError> {
    let payload = validate_delete(&query)?;

    let deleted = app_state.tag_store.delete_tag_by_id(payload.id).await?;
    if !deleted {
        warn!(user_id = authenticated_user.id, tag_id = payload.id, "Store did not delete tag.");
        return Err(AppError::OperationFailed("Failed to delete tag"));
    }

    info!(user_id = authenticated_user.id, tag_id = payload.id, "Tag deleted.");
    Ok(ApiResponse::success(true))
}

async fn bind_page_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ApiResponse<bool>, AppError> {
    let payload = validate_page_binding(&parse_json_body(&body))?;

    let outcome = services::bind_pages(
        app_state.tag_store.as_ref(),
        &app_state.tag_locks,
        payload.id,
        &payload.page_ids,
    )
    .await?;

    binding_response(outcome, "Failed to bind pages").inspect(|_| {
        info!(
            user_id = authenticated_user.id,
            tag_id = payload.id,
            pages = payload.page_ids.len(),
            "Pages bound to tag."
        );
    })
}

async fn unbind_page_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<ApiResponse<bool>, AppError> {
    let payload = validate_page_binding(&parse_json_body(&body))?;

    let outcome = services::unbind_pages(
        app_state.tag_store.as_ref(),
        &app_state.tag_locks,
        payload.id,
        &payload.page_ids,
    )
    .await?;

    binding_response(outcome, "Failed to unbind pages").inspect(|_| {
        info!(
            user_id = authenticated_user.id,
            tag_id = payload.id,
            pages = payload.page_ids.len(),
            "Pages unbound from tag."
        );
    })
}

fn binding_response(
    outcome: BindingOutcome,
    failure_message: &'static str,
) -> Result<ApiResponse<bool>, AppError> {
    match outcome {
        BindingOutcome::Updated => Ok(ApiResponse::success(true)),
        BindingOutcome::NotUpdated => Err(AppError::OperationFailed(failure_message)),
        BindingOutcome::TagNotFound => Err(AppError::NotFound("Tag not found".to_string())),
    }
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all", get(list_tags_handler))
        .route("/create", post(create_tag_handler))
        .route("/update", post(update_tag_handler))
        .route("/delete", delete(delete_tag_handler))
        .route("/bind_page", post(bind_page_handler))
        .route("/unbind_page", post(unbind_page_handler))
}
