use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::error::ApiError;
use crate::services::UploadFile;

/// Parts of a multipart upload this API understands.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub document_type: Option<String>,
    pub file: Option<UploadFile>,
}

/// Read every part, keeping the text field `document_type` and the first
/// file found under `file_field`. Unknown parts are drained and ignored.
pub async fn read_upload_form(multipart: &mut Multipart, file_field: &str) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "document_type" {
            form.document_type = Some(field.text().await.map_err(multipart_error)?);
        } else if name == file_field && form.file.is_none() {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            form.file = Some(UploadFile {
                file_name,
                bytes: bytes.to_vec(),
            });
        }
    }

    Ok(form)
}

/// Body-limit overruns surface as 413, everything else as a bad request.
pub fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("Uploaded file exceeds the size limit");
    }
    ApiError::bad_request(format!("Invalid multipart request: {}", err.body_text()))
}
