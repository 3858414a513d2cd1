// SPDX-License-Identifier: MIT

//! Video upload pipeline.
//!
//! Strictly sequential: stage the upload to local temp storage, derive a
//! thumbnail, push both blobs to object storage, then write the catalog
//! record. Any step failure aborts before the catalog write. Temp files are
//! owned by scoped guards, so they are removed on every exit path (success,
//! error, or timeout), not just the happy path.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::Video;
use crate::services::{ObjectStore, Thumbnailer};
use crate::time_utils::now_rfc3339;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

/// Namespaces under which blobs are stored remotely.
const VIDEO_NAMESPACE: &str = "videos";
const THUMBNAIL_NAMESPACE: &str = "thumbnails";

/// Metadata fields of a multipart upload submission. The binary itself is
/// staged separately via [`UploadPipeline::stage`].
#[derive(Debug)]
pub struct UploadRequest {
    pub topic: String,
    pub course: String,
    /// Only consulted when `course == "new"`
    pub new_course: Option<String>,
    pub description: String,
    pub summary: String,
}

/// An upload being streamed to local staging storage.
///
/// The backing file is removed when this handle drops, so an aborted or
/// rejected request cannot leak a staged file.
pub struct StagedUpload {
    guard: TempFile,
    file: tokio::fs::File,
}

impl StagedUpload {
    /// Append one chunk of the incoming body.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        self.file.write_all(chunk).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to stage upload {}: {}",
                self.guard.path().display(),
                e
            ))
        })
    }
}

/// Sequences the upload steps and owns their timeout policy.
pub struct UploadPipeline {
    db: FirestoreDb,
    object_store: ObjectStore,
    thumbnailer: Thumbnailer,
    temp_dir: PathBuf,
    step_timeout: Duration,
}

impl UploadPipeline {
    pub fn new(
        db: FirestoreDb,
        object_store: ObjectStore,
        thumbnailer: Thumbnailer,
        temp_dir: PathBuf,
        timeout_secs: u64,
    ) -> Self {
        Self {
            db,
            object_store,
            thumbnailer,
            temp_dir,
            step_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Open a staging file for an incoming upload, timestamp-prefixed to
    /// avoid collisions between concurrent uploads. The caller streams the
    /// body into it chunk by chunk, then hands it to [`run`](Self::run), so
    /// the upload never sits fully buffered in memory.
    pub async fn stage(&self, file_name: &str) -> Result<StagedUpload, AppError> {
        tokio::fs::create_dir_all(&self.temp_dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create temp dir {}: {}",
                self.temp_dir.display(),
                e
            ))
        })?;

        let staged_name = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(file_name)
        );
        let guard = TempFile::new(self.temp_dir.join(staged_name));
        let file = tokio::fs::File::create(guard.path()).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create staging file {}: {}",
                guard.path().display(),
                e
            ))
        })?;

        Ok(StagedUpload { guard, file })
    }

    /// Run the full pipeline over a staged upload and return the created
    /// catalog record.
    pub async fn run(
        &self,
        request: UploadRequest,
        staged: StagedUpload,
    ) -> Result<Video, AppError> {
        let course = resolve_course(&request.course, request.new_course.as_deref())?;
        if request.topic.trim().is_empty() {
            return Err(AppError::Validation("topic is required".to_string()));
        }

        // 1. Close the staging write handle; in-flight writes must land
        //    before ffmpeg reads the file.
        let StagedUpload {
            guard: video_file,
            mut file,
        } = staged;
        file.flush()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to flush staged upload: {}", e)))?;
        drop(file);

        // 2. Derive the thumbnail beside it.
        let thumb_name = video_file
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let thumb_file = TempFile::new(self.temp_dir.join(format!("{}.jpg", thumb_name)));
        timeout(
            self.step_timeout,
            self.thumbnailer.derive(video_file.path(), thumb_file.path()),
        )
        .await
        .map_err(|_| AppError::Timeout("thumbnail transcode".to_string()))??;

        // 3. Push both blobs. Sequential, no atomicity between them: if the
        //    thumbnail upload fails, the remote video blob is left in place
        //    (no compensating delete).
        let video_url = timeout(
            self.step_timeout,
            self.object_store.upload(video_file.path(), VIDEO_NAMESPACE),
        )
        .await
        .map_err(|_| AppError::Timeout("video upload".to_string()))??;

        let thumbnail_url = match timeout(
            self.step_timeout,
            self.object_store
                .upload(thumb_file.path(), THUMBNAIL_NAMESPACE),
        )
        .await
        .map_err(|_| AppError::Timeout("thumbnail upload".to_string()))
        {
            Ok(Ok(url)) => url,
            Ok(Err(e)) | Err(e) => {
                tracing::warn!(
                    video_url = %video_url,
                    "Thumbnail upload failed after video upload; remote video blob orphaned"
                );
                return Err(e);
            }
        };

        // 4. Catalog write happens only once every upstream step succeeded.
        let video = Video {
            id: uuid::Uuid::new_v4().to_string(),
            topic: request.topic.trim().to_string(),
            course,
            description: request.description,
            summary: request.summary,
            video_url,
            thumbnail_url,
            created_at: now_rfc3339(),
        };
        self.db.create_video(&video).await?;

        tracing::info!(
            video_id = %video.id,
            course = %video.course,
            "Upload pipeline complete"
        );

        // 5. The TempFile guards drop here and remove both staged files.
        Ok(video)
    }
}

/// Resolve the effective course name from the form fields.
///
/// `course == "new"` means the client typed a fresh course label into
/// `new_course`; anything else is used as-is.
pub fn resolve_course(course: &str, new_course: Option<&str>) -> Result<String, AppError> {
    if course == "new" {
        match new_course.map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(AppError::Validation(
                "newCourse is required when course is \"new\"".to_string(),
            )),
        }
    } else if course.trim().is_empty() {
        Err(AppError::Validation("course is required".to_string()))
    } else {
        Ok(course.trim().to_string())
    }
}

/// Strip anything path-like from a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Scoped handle to a transient file; removes it when dropped.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove temp file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_course_passthrough() {
        assert_eq!(resolve_course("Algebra", None).unwrap(), "Algebra");
        assert_eq!(
            resolve_course("Algebra", Some("ignored")).unwrap(),
            "Algebra"
        );
    }

    #[test]
    fn test_resolve_course_new() {
        assert_eq!(resolve_course("new", Some("Algebra")).unwrap(), "Algebra");
        assert_eq!(
            resolve_course("new", Some("  Linear Algebra ")).unwrap(),
            "Linear Algebra"
        );
    }

    #[test]
    fn test_resolve_course_new_requires_name() {
        assert!(resolve_course("new", None).is_err());
        assert!(resolve_course("new", Some("   ")).is_err());
        assert!(resolve_course("", None).is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("lecture 1.mp4"), "lecture_1.mp4");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("..."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn test_temp_file_removed_on_drop() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("coursetrack-guard-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"x").unwrap();

        {
            let _guard = TempFile::new(path.clone());
        }

        assert!(!path.exists());
    }

    #[test]
    fn test_temp_file_drop_tolerates_missing_file() {
        let path = std::env::temp_dir().join(format!("coursetrack-none-{}", uuid::Uuid::new_v4()));
        let _guard = TempFile::new(path);
        // Drop must not panic on a file that never existed.
    }
}
