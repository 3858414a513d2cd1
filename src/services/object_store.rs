// SPDX-License-Identifier: MIT

//! Object storage gateway (S3) for video and thumbnail blobs.
//!
//! One attempt per upload, no retries: a network failure propagates as a
//! pipeline failure. The two pipeline uploads (video, thumbnail) are
//! independent calls with no atomicity between them.

use crate::error::AppError;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::path::Path;

/// S3-backed blob store returning stable public URLs.
#[derive(Clone)]
pub struct ObjectStore {
    client: Option<S3Client>,
    bucket: String,
    public_base_url: String,
}

impl ObjectStore {
    /// Create a new gateway.
    ///
    /// `endpoint_url` overrides the AWS endpoint for MinIO/LocalStack; those
    /// setups get path-style URLs.
    pub async fn new(
        bucket: &str,
        region: &str,
        endpoint_url: Option<&str>,
    ) -> Result<Self, AppError> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = S3Client::from_conf(builder.build());

        let public_base_url = match endpoint_url {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        };

        Ok(Self {
            client: Some(client),
            bucket: bucket.to_string(),
            public_base_url,
        })
    }

    /// Create a mock gateway for testing (offline mode).
    ///
    /// Uploads verify the local file exists, then return a deterministic URL
    /// without any network traffic.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            bucket: "test-bucket".to_string(),
            public_base_url: "https://test-bucket.mock.local".to_string(),
        }
    }

    /// Upload a local file under `namespace/` and return its public URL.
    ///
    /// The call suspends until the remote service acknowledges the write.
    pub async fn upload(&self, local_path: &Path, namespace: &str) -> Result<String, AppError> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::Upstream(format!("Invalid upload path: {}", local_path.display()))
            })?;
        let key = format!("{}/{}", namespace, file_name);

        let Some(client) = self.client.as_ref() else {
            // Mock mode still requires the staged file to be present.
            tokio::fs::metadata(local_path).await.map_err(|e| {
                AppError::Upstream(format!("Staged file missing: {}: {}", local_path.display(), e))
            })?;
            return Ok(format!("{}/{}", self.public_base_url, key));
        };

        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            AppError::Upstream(format!("Failed to read {}: {}", local_path.display(), e))
        })?;

        client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type(content_type_for(file_name))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("S3 upload of {} failed: {}", key, e)))?;

        tracing::info!(key = %key, "Blob uploaded");
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    /// Delete a blob by key (best effort, used when an admin removes a video).
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let Some(client) = self.client.as_ref() else {
            return Ok(());
        };

        client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("S3 delete of {} failed: {}", key, e)))?;

        tracing::debug!(key = %key, "Blob deleted");
        Ok(())
    }

    /// Recover the object key from a URL this store produced.
    pub fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&format!("{}/", self.public_base_url))
            .map(String::from)
    }
}

/// Content type by file extension.
fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "jpeg" | "jpg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("lecture.mp4"), "video/mp4");
        assert_eq!(content_type_for("lecture.MP4"), "video/mp4");
        assert_eq!(content_type_for("thumb.jpg"), "image/jpeg");
        assert_eq!(content_type_for("noextension"), "application/octet-stream");
    }

    #[test]
    fn test_key_for_url_round_trip() {
        let store = ObjectStore::new_mock();
        let url = "https://test-bucket.mock.local/videos/123-lecture.mp4";
        assert_eq!(
            store.key_for_url(url),
            Some("videos/123-lecture.mp4".to_string())
        );
        assert_eq!(store.key_for_url("https://elsewhere.example/x"), None);
    }
}
