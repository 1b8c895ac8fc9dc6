use axum::{
    extract::{Multipart, Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::PROFILE_PHOTO;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UploadedDocument;

use super::utils::read_upload_form;

/// POST /api/employee/:id/image - Profile photo upload, multipart field `image`
///
/// Stored as a `PROFILE_PHOTO` document, so the one-active-photo rule applies.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> ApiResult<UploadedDocument> {
    let form = read_upload_form(&mut multipart, "image").await?;

    let uploaded = state
        .document_service()
        .upload(&user.scope, id, Some(PROFILE_PHOTO), form.file)
        .await?;

    Ok(ApiResponse::created(uploaded).with_message("Image uploaded successfully"))
}
