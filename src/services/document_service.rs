//! Employee documents: identity proofs and profile photos.
//!
//! Metadata lives in `employee_document`; the bytes go through a
//! [`BlobSink`]. An employee holds at most one active identity document and
//! one active `PROFILE_PHOTO`. Deletion is a soft delete of the metadata
//! followed by a best-effort blob removal.

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::{Document, PROFILE_PHOTO};
use crate::database::Database;
use crate::services::employee_query::ensure_in_region;
use crate::services::employee_service::EmployeeError;
use crate::storage::{BlobRemoval, BlobSink, StorageError};
use crate::types::RegionScope;

const ONE_ACTIVE_PROOF_INDEX: &str = "employee_document_one_active_proof";
const ONE_ACTIVE_PHOTO_INDEX: &str = "employee_document_one_active_photo";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document type required")]
    MissingDocumentType,

    #[error("File is required")]
    MissingFile,

    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("Document not found or already deleted")]
    NotFound,

    #[error("You have already uploaded {0}. Please delete it first to upload a different document.")]
    DuplicateDocumentType(String),

    #[error("Profile photo already uploaded. Please delete it first to upload a new one.")]
    DuplicatePhoto,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<EmployeeError> for DocumentError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::Database(e) => DocumentError::Database(e),
            _ => DocumentError::EmployeeNotFound,
        }
    }
}

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedDocument {
    pub document_id: i32,
    pub document_type: String,
    pub file_url: String,
    pub file_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentDeletion {
    pub document_id: i32,
    pub blob: BlobRemoval,
}

/// Decide whether `document_type` may be added next to the employee's
/// currently active document types.
pub fn check_upload_conflict(document_type: &str, active_types: &[String]) -> Result<(), DocumentError> {
    if document_type == PROFILE_PHOTO {
        if active_types.iter().any(|t| t == PROFILE_PHOTO) {
            return Err(DocumentError::DuplicatePhoto);
        }
        return Ok(());
    }

    match active_types.iter().find(|t| *t != PROFILE_PHOTO) {
        Some(existing) => Err(DocumentError::DuplicateDocumentType(existing.clone())),
        None => Ok(()),
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// A concurrent upload can pass the pre-check and lose on the partial unique
/// index instead.
fn classify_insert(err: sqlx::Error) -> DocumentError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(ONE_ACTIVE_PHOTO_INDEX) => return DocumentError::DuplicatePhoto,
            Some(ONE_ACTIVE_PROOF_INDEX) => {
                return DocumentError::DuplicateDocumentType("an identity document".to_string())
            }
            _ => {}
        }
    }
    DocumentError::Database(err)
}

#[derive(Clone)]
pub struct DocumentService {
    db: Database,
    blobs: Arc<dyn BlobSink>,
}

impl DocumentService {
    pub fn new(db: Database, blobs: Arc<dyn BlobSink>) -> Self {
        Self { db, blobs }
    }

    pub async fn upload(
        &self,
        scope: &RegionScope,
        employee_id: i32,
        document_type: Option<&str>,
        file: Option<UploadFile>,
    ) -> Result<UploadedDocument, DocumentError> {
        let document_type = document_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DocumentError::MissingDocumentType)?
            .to_ascii_uppercase();
        let file = file.filter(|f| !f.bytes.is_empty()).ok_or(DocumentError::MissingFile)?;

        let pool = self.db.pool();
        ensure_in_region(pool, scope, employee_id).await?;

        let active_types: Vec<String> = sqlx::query_scalar(
            "SELECT document_type FROM employee_document
             WHERE employee_id = $1 AND is_active
             ORDER BY uploaded_at",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await?;

        if let Err(e) = check_upload_conflict(&document_type, &active_types) {
            warn!(employee_id, "Upload refused: {}", e);
            return Err(e);
        }

        let checksum = sha256_hex(&file.bytes);
        let file_url = self.blobs.store(&file.file_name, &file.bytes).await?;

        let inserted: Result<i32, sqlx::Error> = sqlx::query_scalar(
            "INSERT INTO employee_document
                (employee_id, document_type, document_name, file_url, file_sha256, is_active)
             VALUES ($1, $2, $3, $4, $5, true)
             RETURNING document_id",
        )
        .bind(employee_id)
        .bind(&document_type)
        .bind(&file.file_name)
        .bind(&file_url)
        .bind(&checksum)
        .fetch_one(pool)
        .await;

        let document_id = match inserted {
            Ok(id) => id,
            Err(e) => {
                let outcome = self.blobs.delete(&file_url).await;
                warn!(employee_id, "Document insert failed, orphan blob {}: {:?}", file_url, outcome);
                return Err(classify_insert(e));
            }
        };

        info!(employee_id, document_id, document_type = %document_type, bytes = file.bytes.len(), "Document uploaded");

        Ok(UploadedDocument {
            document_id,
            document_type,
            file_url,
            file_sha256: checksum,
        })
    }

    /// Active documents of one employee, oldest first.
    pub async fn list(&self, scope: &RegionScope, employee_id: i32) -> Result<Vec<Document>, DocumentError> {
        let pool = self.db.pool();
        ensure_in_region(pool, scope, employee_id).await?;

        let documents = sqlx::query_as(
            "SELECT document_id, employee_id, document_type, document_name, file_url,
                    file_sha256, is_active, uploaded_at
             FROM employee_document
             WHERE employee_id = $1 AND is_active
             ORDER BY uploaded_at, document_id",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    /// Soft-delete the metadata, then remove the blob. The removal outcome is
    /// reported, never raised.
    pub async fn delete(&self, scope: &RegionScope, document_id: i32) -> Result<DocumentDeletion, DocumentError> {
        let file_url: Option<String> = sqlx::query_scalar(
            "UPDATE employee_document d
             SET is_active = false
             FROM employee e
             JOIN location l ON l.location_id = e.location_id
             WHERE d.document_id = $1
               AND d.is_active
               AND e.employee_id = d.employee_id
               AND l.region_id = $2
             RETURNING d.file_url",
        )
        .bind(document_id)
        .bind(scope.region_id)
        .fetch_optional(self.db.pool())
        .await?;

        let file_url = file_url.ok_or(DocumentError::NotFound)?;

        let blob = self.blobs.delete(&file_url).await;
        match &blob {
            BlobRemoval::Removed => info!(document_id, "Document deleted"),
            other => warn!(document_id, "Document deleted but file {} was not removed: {:?}", file_url, other),
        }

        Ok(DocumentDeletion { document_id, blob })
    }
}
