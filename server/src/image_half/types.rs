//! Image-half payload types and error definitions

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::invocation::InvocationError;
use crate::storage::StorageError;

/// Blob read by the pipeline, relative to the payload directory
pub const SOURCE_BLOB: &str = "image.jpg";

/// Blob written by the pipeline, relative to the payload directory
pub const HALF_BLOB: &str = "image-half.jpg";

/// Errors that can end an image-half invocation
#[derive(Debug, Error)]
pub enum ImageHalfError {
    #[error("{0}")]
    BadRequest(#[from] InvocationError),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Upstream(#[from] StorageError),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to resample image: {0}")]
    Resample(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image worker failed: {0}")]
    Internal(String),
}

impl ImageHalfError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ImageHalfError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ImageHalfError::BadRequest(_) => "bad_request",
            ImageHalfError::Config(_) => "config",
            ImageHalfError::Upstream(StorageError::Cancelled) => "cancelled",
            ImageHalfError::Upstream(StorageError::DeadlineExceeded) => "deadline",
            ImageHalfError::Upstream(_) => "upstream",
            ImageHalfError::Decode(_) => "decode",
            ImageHalfError::Resample(_) => "resample",
            ImageHalfError::Encode(_) => "encode",
            ImageHalfError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ImageHalfError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Where the source image lives and where its half-size copy goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageLocation {
    pub container: String,
    pub directory: String,
}

impl ImageLocation {
    pub fn new(container: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            directory: directory.into(),
        }
    }

    /// Reject locations that cannot name a blob
    pub fn validate(&self) -> Result<(), InvocationError> {
        if self.container.trim().is_empty() {
            return Err(InvocationError::Payload(
                "Container must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the source image inside the container
    pub fn source_path(&self) -> String {
        self.blob_path(SOURCE_BLOB)
    }

    /// Path of the derived image inside the container
    pub fn half_path(&self) -> String {
        self.blob_path(HALF_BLOB)
    }

    fn blob_path(&self, name: &str) -> String {
        let directory = self.directory.trim_matches('/');
        if directory.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", directory, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_paths() {
        let location = ImageLocation::new("c", "d");
        assert_eq!(location.source_path(), "d/image.jpg");
        assert_eq!(location.half_path(), "d/image-half.jpg");

        let nested = ImageLocation::new("c", "/2024/05/");
        assert_eq!(nested.source_path(), "2024/05/image.jpg");

        let root = ImageLocation::new("c", "");
        assert_eq!(root.half_path(), "image-half.jpg");
    }

    #[test]
    fn test_location_wire_names() {
        let location: ImageLocation =
            serde_json::from_str(r#"{"Container":"c","Directory":"d"}"#).unwrap();
        assert_eq!(location, ImageLocation::new("c", "d"));
        assert!(serde_json::from_str::<ImageLocation>(r#"{"Container":"c"}"#).is_err());
        assert!(
            serde_json::from_str::<ImageLocation>(r#"{"Container":1,"Directory":"d"}"#).is_err()
        );
    }

    #[test]
    fn test_location_survives_envelope_roundtrip() {
        use crate::invocation::{InvokeRequest, unwrap_payload};

        let cases = [
            ImageLocation::new("c", "d"),
            ImageLocation::new("c\"q", "d\\e/日本"),
            ImageLocation::new("", ""),
            ImageLocation::new("a b", "\u{0}\n"),
            ImageLocation::new("photos", "2024/05/{\"x\":1}"),
            ImageLocation::new("émoji-🖼", "//leading/and/trailing//"),
        ];

        for location in cases {
            let body = serde_json::to_vec(&InvokeRequest::with_value(&location).unwrap()).unwrap();
            let decoded: ImageLocation = unwrap_payload(&body).unwrap();
            assert_eq!(decoded, location, "round-trip of {:?}", location);
        }
    }

    #[test]
    fn test_empty_container_rejected() {
        assert!(ImageLocation::new("  ", "d").validate().is_err());
        assert!(ImageLocation::new("c", "").validate().is_ok());
    }

    #[test]
    fn test_status_mapping() {
        let bad = ImageHalfError::BadRequest(InvocationError::MissingValue("value".into()));
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ImageHalfError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ImageHalfError::Upstream(StorageError::Cancelled).kind(),
            "cancelled"
        );
        assert_eq!(
            ImageHalfError::Decode("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
