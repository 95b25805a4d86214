use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use sea_orm::{prelude::*, TransactionTrait};
use serde::{Serialize, Deserialize};

use tabbycat_entities::images::{parse_data_url, BlobAttachment, StorageError};
use tabbycat_entities::prelude::*;

use crate::{
    action_log::log_action,
    auth::{AuthenticatedUser, RequireSuperuser},
    response::{handle_error, APIError},
    state::AppState,
};


fn storage_error(err: StorageError) -> APIError {
    match err {
        StorageError::NotFound(_) => APIError::not_found("File not found"),
        StorageError::InvalidDataUrl | StorageError::InvalidName(_) => APIError::bad_request(err.to_string()),
        err => handle_error(err),
    }
}

/// Attachments are shared between tournaments, so changes are logged against the first one.
async fn log_attachment_action<C>(db: &C, action_type: ActionLogType, user: &AuthenticatedUser, content: String) -> Result<(), DbErr> where C: ConnectionTrait {
    match Tournament::get_first(db).await? {
        Some(tournament) => log_action(db, action_type, user, &tournament, None, Some(content)).await,
        None => {
            tracing::debug!("No tournament to log {} against", action_type.as_str());
            Ok(())
        }
    }
}


#[derive(Debug, Serialize, Deserialize)]
pub struct UploadAttachmentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttachmentResponse {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub file: String,
    pub url: String,
}

async fn upload_attachment_handler(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    Json(request): Json<UploadAttachmentRequest>,
) -> Result<Json<AttachmentResponse>, APIError> {
    let (mimetype, content) = parse_data_url(&request.data).map_err(storage_error)?;
    if !mimetype.starts_with("image/") {
        return Err(APIError::bad_request(format!("Only images can be uploaded, got {}", mimetype)));
    }
    if content.len() > state.max_upload_size {
        return Err(APIError::new_with_status(
            StatusCode::PAYLOAD_TOO_LARGE,
            &format!("File exceeds the upload limit of {} bytes", state.max_upload_size)
        ));
    }

    let filename = request.filename.clone()
        .or_else(|| request.name.clone())
        .unwrap_or_else(|| "image".to_string());

    let txn = state.db.begin().await?;
    let attachment = BlobAttachment::create(&txn, &state.storage, request.name, &filename, &content, &mimetype)
        .await
        .map_err(storage_error)?;
    log_attachment_action(&txn, ActionLogType::AttachmentUpload, &user, attachment.file.clone()).await?;
    txn.commit().await?;

    tracing::info!("Stored attachment {} ({} bytes)", attachment.file, content.len());
    Ok(Json(AttachmentResponse {
        uuid: attachment.uuid,
        url: state.storage.url(&attachment.file),
        name: attachment.name,
        file: attachment.file,
    }))
}

async fn delete_attachment_handler(
    State(state): State<AppState>,
    RequireSuperuser(user): RequireSuperuser,
    Path(attachment_id): Path<Uuid>,
) -> Result<StatusCode, APIError> {
    let txn = state.db.begin().await?;
    let attachment = BlobAttachment::get(&txn, attachment_id).await?
        .ok_or_else(|| APIError::not_found("Attachment not found"))?;
    let file = attachment.file.clone();
    attachment.delete(&txn, &state.storage).await.map_err(storage_error)?;
    log_attachment_action(&txn, ActionLogType::AttachmentDelete, &user, file).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn serve_file_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, APIError> {
    let file = state.storage.open(&state.db, &filename).await.map_err(storage_error)?;
    let etag = format!("\"{:x}\"", seahash::hash(&file.content));

    if headers.get(header::IF_NONE_MATCH).and_then(|v| v.to_str().ok()) == Some(etag.as_str()) {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let content_type = HeaderValue::from_str(&file.mimetype)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let etag = HeaderValue::from_str(&etag).map_err(handle_error)?;
    Ok((
        [(header::CONTENT_TYPE, content_type), (header::ETAG, etag)],
        file.content
    ).into_response())
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/images/attachments", post(upload_attachment_handler))
        .route("/images/attachments/:attachment_id", delete(delete_attachment_handler))
        .route("/images/file/:filename", get(serve_file_handler))
}
