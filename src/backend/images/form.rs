/**
 * Multipart Forms
 *
 * Collects a `multipart/form-data` body into text fields plus at most one
 * file, sent in the `upload` field.
 */
use axum::extract::Multipart;
use std::collections::HashMap;

use crate::backend::error::BackendError;
use crate::backend::images::ImageUpload;
use crate::shared::SharedError;

/// Name of the file field
pub const UPLOAD_FIELD: &str = "upload";

/// A fully read multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    upload: Option<ImageUpload>,
}

impl UploadForm {
    /// Text value of a field, if sent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text value of a field that must be present
    pub fn required(&self, name: &str) -> Result<&str, SharedError> {
        self.text(name)
            .ok_or_else(|| SharedError::validation(name, format!("{} is required", name)))
    }

    /// Integer value of a field that must be present
    pub fn required_i64(&self, name: &str) -> Result<i64, SharedError> {
        self.required(name)?
            .trim()
            .parse()
            .map_err(|_| SharedError::validation(name, format!("{} must be a whole number", name)))
    }

    /// Take the uploaded file out of the form
    pub fn take_upload(&mut self) -> Option<ImageUpload> {
        self.upload.take()
    }
}

/// Read every part of a multipart body
///
/// Empty file parts count as no upload.
///
/// # Errors
/// `BackendError::Validation` if the body is not valid multipart or a text
/// field is not UTF-8
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, BackendError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BackendError::validation("form", e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == UPLOAD_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| BackendError::validation(UPLOAD_FIELD, e.body_text()))?;
            if !bytes.is_empty() {
                form.upload = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| BackendError::validation(name.clone(), e.body_text()))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            upload: None,
        }
    }

    #[test]
    fn test_required_fields() {
        let form = form(&[("name", "Mug"), ("price", " 700 ")]);
        assert_eq!(form.required("name").unwrap(), "Mug");
        assert_eq!(form.required_i64("price").unwrap(), 700);
        assert_eq!(form.required("description").unwrap_err().field(), Some("description"));
    }

    #[test]
    fn test_non_numeric_value() {
        let form = form(&[("price", "seven")]);
        assert_eq!(form.required_i64("price").unwrap_err().field(), Some("price"));
    }

    #[test]
    fn test_take_upload_once() {
        let mut form = form(&[]);
        form.upload = Some(ImageUpload {
            file_name: "a.png".to_string(),
            content_type: None,
            bytes: bytes::Bytes::from_static(b"x"),
        });
        assert!(form.take_upload().is_some());
        assert!(form.take_upload().is_none());
    }
}
