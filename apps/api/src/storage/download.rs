use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;

use crate::storage::{sanitize_filename, PresignError};

/// Presigns a GET that downloads `key` as an attachment named `filename`.
pub async fn presign_download(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    filename: &str,
    content_type: &str,
    ttl_secs: u64,
) -> Result<String, PresignError> {
    let presigning = PresigningConfig::expires_in(Duration::from_secs(ttl_secs))
        .map_err(|e| PresignError::Presign(e.to_string()))?;

    let request = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .response_content_type(content_type)
        .response_content_disposition(content_disposition(filename))
        .presigned(presigning)
        .await
        .map_err(|e| PresignError::Presign(e.to_string()))?;

    Ok(request.uri().to_string())
}

fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", sanitize_filename(filename))
}
