//! Presigned object-storage URLs.
//!
//! Bytes never pass through this service. Uploads get a signed browser-POST
//! policy; downloads get a presigned GET from the S3 SDK.

pub mod download;
pub mod handlers;
pub mod post_policy;

use thiserror::Error;
use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum PresignError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("presign failed: {0}")]
    Presign(String),
}

/// What an object belongs to. Also the first segment of its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadResource {
    Company,
    Profile,
    Resume,
    CoverLetter,
}

const IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];
const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

impl UploadResource {
    pub fn parse(raw: &str) -> Result<Self, PresignError> {
        match raw.trim().to_lowercase().as_str() {
            "company" => Ok(UploadResource::Company),
            "profile" => Ok(UploadResource::Profile),
            "resume" => Ok(UploadResource::Resume),
            "cover-letter" => Ok(UploadResource::CoverLetter),
            other => Err(PresignError::InvalidRequest(format!(
                "Unknown upload resource '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadResource::Company => "company",
            UploadResource::Profile => "profile",
            UploadResource::Resume => "resume",
            UploadResource::CoverLetter => "cover-letter",
        }
    }

    fn allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            UploadResource::Company | UploadResource::Profile => IMAGE_TYPES,
            UploadResource::Resume | UploadResource::CoverLetter => DOCUMENT_TYPES,
        }
    }

    pub fn check_content_type(&self, content_type: &str) -> Result<(), PresignError> {
        let normalized = content_type.trim().to_lowercase();
        if self.allowed_content_types().contains(&normalized.as_str()) {
            Ok(())
        } else {
            Err(PresignError::InvalidRequest(format!(
                "Content type '{content_type}' is not allowed for {} uploads",
                self.as_str()
            )))
        }
    }

    /// A fresh object key under this resource's prefix.
    pub fn new_object_key(&self, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.as_str(),
            Uuid::new_v4(),
            sanitize_filename(filename)
        )
    }

    /// Rejects keys outside this resource's prefix or with traversal segments.
    pub fn check_object_key(&self, key: &str) -> Result<(), PresignError> {
        let prefix = format!("{}/", self.as_str());
        let traverses = key.split('/').any(|seg| seg == ".." || seg.is_empty());
        if !key.starts_with(&prefix) || traverses {
            return Err(PresignError::InvalidRequest(format!(
                "Object key does not belong to {}",
                self.as_str()
            )));
        }
        Ok(())
    }
}

/// Keeps ASCII letters, digits, `.`, `-`, `_`; everything else becomes `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource() {
        assert_eq!(UploadResource::parse("company").unwrap(), UploadResource::Company);
        assert_eq!(
            UploadResource::parse("Cover-Letter").unwrap(),
            UploadResource::CoverLetter
        );
        assert!(UploadResource::parse("avatars").is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("logo final (2).png"), "logo_final__2_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), MAX_FILENAME_LEN);
    }

    #[test]
    fn test_new_object_key_is_prefixed() {
        let key = UploadResource::Company.new_object_key("logo.png");
        assert!(key.starts_with("company/"));
        assert!(key.ends_with("/logo.png"));
        assert!(UploadResource::Company.check_object_key(&key).is_ok());
    }

    #[test]
    fn test_check_object_key_rejects_other_prefix_and_traversal() {
        assert!(UploadResource::Company
            .check_object_key("resume/abc/cv.pdf")
            .is_err());
        assert!(UploadResource::Company
            .check_object_key("company/../resume/cv.pdf")
            .is_err());
        assert!(UploadResource::Company.check_object_key("company//x").is_err());
    }

    #[test]
    fn test_content_type_rules() {
        assert!(UploadResource::Company.check_content_type("image/png").is_ok());
        assert!(UploadResource::Company
            .check_content_type("application/pdf")
            .is_err());
        assert!(UploadResource::Resume
            .check_content_type("Application/PDF")
            .is_ok());
    }
}
