use axum::{
    extract::{Multipart, Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::Document;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{DocumentDeletion, UploadedDocument};

use super::utils::read_upload_form;

/// POST /api/employee/:id/document - Multipart `document_type` + `file`
///
/// One active identity document and one active `PROFILE_PHOTO` per employee;
/// a second of either kind is a 409 until the first is deleted.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> ApiResult<UploadedDocument> {
    let form = read_upload_form(&mut multipart, "file").await?;

    let uploaded = state
        .document_service()
        .upload(&user.scope, id, form.document_type.as_deref(), form.file)
        .await?;

    Ok(ApiResponse::created(uploaded).with_message("Document uploaded successfully"))
}

/// GET /api/employee/:id/documents - Active documents of one employee
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<Document>> {
    let documents = state.document_service().list(&user.scope, id).await?;
    Ok(ApiResponse::success(documents))
}

/// DELETE /api/employee/document/:id - Soft delete, then remove the file
///
/// The file removal outcome is reported under `data.blob`.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<DocumentDeletion> {
    let deletion = state.document_service().delete(&user.scope, id).await?;
    Ok(ApiResponse::success(deletion).with_message("Document deleted successfully"))
}
