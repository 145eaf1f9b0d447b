//! Image Hosting
//!
//! Product pictures and profile images are stored with an external image
//! host. Handlers read the multipart upload ([`form`]), the services hand
//! it to an [`ImageHost`] and keep only the returned URL.
//!
//! # Implementations
//!
//! - [`cloudinary::CloudinaryHost`] - Cloudinary's upload API over reqwest
//! - [`DisabledImageHost`] - used when `CLOUDINARY_URL` is not set; every
//!   call fails with [`ImageError::NotConfigured`]

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

/// Cloudinary client
pub mod cloudinary;

/// Multipart form reading
pub mod form;

pub use cloudinary::CloudinaryHost;
pub use form::{read_upload_form, UploadForm};

/// Image host errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image uploads are not configured")]
    NotConfigured,

    #[error("invalid image host url: {0}")]
    InvalidUrl(String),

    #[error("image host request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("image host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// A file received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Where the host put an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    #[serde(rename = "secure_url")]
    pub url: String,
    pub public_id: String,
}

/// External image storage
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store a file and return its public URL and id
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, ImageError>;

    /// Remove a previously uploaded file
    async fn delete(&self, public_id: &str) -> Result<(), ImageError>;
}

/// Image host used when no provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _image: ImageUpload) -> Result<UploadedImage, ImageError> {
        Err(ImageError::NotConfigured)
    }

    async fn delete(&self, _public_id: &str) -> Result<(), ImageError> {
        Err(ImageError::NotConfigured)
    }
}
