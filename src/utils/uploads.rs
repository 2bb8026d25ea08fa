use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Spool one multipart file field to a local temp path. Files are staged here
/// before being forwarded to the remote media host, then unlinked.
pub async fn save_temp_file(field: Field<'_>, upload_dir: &str) -> AppResult<PathBuf> {
    let original_name = field
        .file_name()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "upload".to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid file upload: {}", e)))?;

    fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;

    let path = Path::new(upload_dir).join(format!("{}-{}", Uuid::new_v4(), original_name));
    fs::write(&path, &data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write temp file: {}", e)))?;

    Ok(path)
}

/// Best-effort unlink, used on success and failure paths alike.
pub async fn remove_temp_file(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        tracing::warn!("Failed to remove temp file {}: {}", path.display(), e);
    }
}
