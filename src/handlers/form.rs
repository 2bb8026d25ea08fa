use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;

use crate::error::{AppError, AppResult};
use crate::utils::uploads::{remove_temp_file, save_temp_file};

/// Text fields and spooled file paths collected from one multipart request.
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, PathBuf>,
}

impl FormData {
    /// Drain a multipart stream. Parts named in `file_fields` that carry a
    /// filename are spooled to the upload dir; everything else is read as text.
    pub async fn collect(
        mut multipart: Multipart,
        upload_dir: &str,
        file_fields: &[&str],
    ) -> AppResult<Self> {
        let mut fields = HashMap::new();
        let mut files = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
        {
            let Some(name) = field.name().map(|n| n.to_string()) else {
                continue;
            };

            if file_fields.contains(&name.as_str()) && field.file_name().is_some() {
                let path = save_temp_file(field, upload_dir).await?;
                files.insert(name, path);
            } else {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid field {}: {}", name, e))
                })?;
                fields.insert(name, value);
            }
        }

        Ok(Self { fields, files })
    }

    /// Non-empty text value of a field, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn file(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(|p| p.as_path())
    }

    /// Unlink every spooled file; called on success and failure paths alike.
    pub async fn cleanup(&self) {
        for path in self.files.values() {
            remove_temp_file(path).await;
        }
    }
}
