//! S3 browser-POST policies signed with AWS Signature Version 4.
//!
//! The SDK presigns single requests only, so the POST policy document and its
//! signature are built here. The policy pins bucket, key, content type and a
//! size range; the storage service rejects any form that deviates.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::json;
use sha2::Sha256;

use crate::config::Config;
use crate::storage::PresignError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
/// S3 refuses presigned credentials older than seven days.
const MAX_POLICY_TTL_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Serialize)]
pub struct PresignedPost {
    pub url: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct PostPolicySigner {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    bucket: String,
    endpoint: String,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, PresignError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| PresignError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// SigV4 key derivation: secret → date → region → service → `aws4_request`.
pub fn derive_signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, PresignError> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

impl PostPolicySigner {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            bucket: bucket.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            &config.s3_region,
            &config.s3_bucket,
            &config.s3_endpoint,
        )
    }

    /// Path-style bucket URL the form is posted to.
    pub fn bucket_url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.bucket)
    }

    pub fn sign(
        &self,
        key: &str,
        content_type: &str,
        max_bytes: u64,
        ttl_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<PresignedPost, PresignError> {
        let date = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let credential = format!(
            "{}/{}/{}/{}/aws4_request",
            self.access_key_id, date, self.region, SERVICE
        );
        let ttl = Duration::seconds(ttl_secs.min(MAX_POLICY_TTL_SECS) as i64);
        let expiration = (now + ttl).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();

        let policy = json!({
            "expiration": expiration,
            "conditions": [
                {"bucket": self.bucket},
                {"key": key},
                {"Content-Type": content_type},
                ["content-length-range", 0, max_bytes],
                {"x-amz-algorithm": ALGORITHM},
                {"x-amz-credential": credential},
                {"x-amz-date": amz_date},
            ]
        });
        let policy_b64 = STANDARD.encode(
            serde_json::to_vec(&policy).map_err(|e| PresignError::Signing(e.to_string()))?,
        );

        let signing_key =
            derive_signing_key(&self.secret_access_key, &date, &self.region, SERVICE)?;
        let signature = hex::encode(hmac_sha256(&signing_key, policy_b64.as_bytes())?);

        let fields = BTreeMap::from([
            ("key".to_string(), key.to_string()),
            ("Content-Type".to_string(), content_type.to_string()),
            ("x-amz-algorithm".to_string(), ALGORITHM.to_string()),
            ("x-amz-credential".to_string(), credential),
            ("x-amz-date".to_string(), amz_date),
            ("policy".to_string(), policy_b64),
            ("x-amz-signature".to_string(), signature),
        ]);

        Ok(PresignedPost {
            url: self.bucket_url(),
            fields,
        })
    }
}
