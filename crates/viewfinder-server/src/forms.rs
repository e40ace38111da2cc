//! Form payloads and their validation.
//!
//! The upload and edit forms arrive as multipart bodies; login is a plain
//! urlencoded form. Validation failures carry the field label so they can be
//! flashed as "Error in <label> field: <message>".

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::AppError;
use crate::media;

/// Urlencoded login form.
#[derive(Debug, serde::Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// A validation failure on a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub label: &'static str,
    pub message: &'static str,
}

impl FieldError {
    /// The flash message for this error.
    pub fn to_message(&self) -> String {
        format!("Error in {} field: {}", self.label, self.message)
    }
}

/// An uploaded file from the `photo` multipart field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name; only its extension is trusted.
    pub original_name: String,
    pub data: Bytes,
}

/// Payload of the photo upload and edit forms.
#[derive(Debug, Clone, Default)]
pub struct PhotoForm {
    pub file: Option<UploadedFile>,
    pub title: String,
    pub description: String,
}

impl PhotoForm {
    /// Read the multipart body into a form payload.
    ///
    /// A `photo` part with an empty file name is what browsers send when no
    /// file was chosen; it is treated as absent.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "photo" => {
                    let original_name = field.file_name().unwrap_or("").to_string();
                    let data = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read field: {e}"))
                    })?;
                    if !original_name.is_empty() && !data.is_empty() {
                        form.file = Some(UploadedFile {
                            original_name,
                            data,
                        });
                    }
                }
                "title" => {
                    form.title = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read field: {e}"))
                    })?;
                }
                "description" => {
                    form.description = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read field: {e}"))
                    })?;
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate the payload. The upload form requires a file; the edit form
    /// does not.
    pub fn validate(&self, file_required: bool) -> Vec<FieldError> {
        let mut errors = Vec::new();

        match &self.file {
            None if file_required => errors.push(FieldError {
                label: "Photo",
                message: "This field is required.",
            }),
            Some(file) if !media::is_allowed_image(&file.original_name) => {
                errors.push(FieldError {
                    label: "Photo",
                    message: "Images only!",
                })
            }
            _ => {}
        }

        errors
    }
}
