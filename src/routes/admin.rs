// SPDX-License-Identifier: MIT

//! Admin routes: video upload/removal and user management.

use crate::error::{AppError, Result};
use crate::services::{StagedUpload, UploadRequest};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Uploads are whole lecture videos; cap the body well above typical sizes.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Routes requiring the admin role (middleware applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/videos", post(upload_video))
        .route("/api/admin/videos/{video_id}", delete(delete_video))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{user_id}", delete(delete_user))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

// ─── Video Upload ────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub topic: String,
    pub course: String,
    pub video_url: String,
    pub thumbnail_url: String,
}

/// Accept a multipart video upload and run the full pipeline.
///
/// Expected fields: `video` (file) plus `topic`, `course`, `newCourse`,
/// `description`, `summary`. The file field is streamed to local staging
/// storage chunk by chunk; the whole upload is never held in memory.
async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut topic = String::new();
    let mut course = String::new();
    let mut new_course = None;
    let mut description = String::new();
    let mut summary = String::new();
    let mut staged: Option<StagedUpload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mut upload = state.upload_pipeline.stage(&file_name).await?;
                while let Some(chunk) = field.chunk().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read upload: {}", e))
                })? {
                    upload.write_chunk(&chunk).await?;
                }
                staged = Some(upload);
            }
            "topic" => topic = read_text(field).await?,
            "course" => course = read_text(field).await?,
            "newCourse" => new_course = Some(read_text(field).await?),
            "description" => description = read_text(field).await?,
            "summary" => summary = read_text(field).await?,
            _ => {} // unknown fields ignored
        }
    }

    let staged =
        staged.ok_or_else(|| AppError::Validation("video file field is required".to_string()))?;

    let video = state
        .upload_pipeline
        .run(
            UploadRequest {
                topic,
                course,
                new_course,
                description,
                summary,
            },
            staged,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: video.id,
            topic: video.topic,
            course: video.course,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
        }),
    ))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart field: {}", e)))
}

// ─── Video Deletion ──────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Remove a video from the catalog, then best-effort delete its blobs.
///
/// Users' watch histories keep their references; progress aggregation
/// skips entries that no longer resolve.
async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let video = state
        .db
        .get_video(&video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    state.db.delete_video(&video_id).await?;
    tracing::info!(video_id = %video_id, course = %video.course, "Video deleted from catalog");

    for url in [&video.video_url, &video.thumbnail_url] {
        if let Some(key) = state.object_store.key_for_url(url) {
            if let Err(e) = state.object_store.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "Failed to delete remote blob");
            }
        }
    }

    Ok(Json(DeleteResponse { success: true }))
}

// ─── User Management ─────────────────────────────────────────

#[derive(Serialize)]
pub struct AdminUserView {
    pub id: String,
    pub name: String,
    pub enrollment_id: String,
    pub college_name: String,
    pub batch: String,
    /// Recovered plaintext; None when the stored blob fails authentication
    pub password: Option<String>,
    pub watched_count: usize,
    pub created_at: String,
}

/// List all users, including recovered plaintext passwords.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<AdminUserView>>> {
    let users = state.db.list_users().await?;

    let views = users
        .into_iter()
        .map(|u| {
            let password = match state.password_vault.decrypt(&u.password_encrypted) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(user_id = %u.id, error = %e, "Stored password failed to decrypt");
                    None
                }
            };
            AdminUserView {
                id: u.id,
                name: u.name,
                enrollment_id: u.enrollment_id,
                college_name: u.college_name,
                batch: u.batch,
                password,
                watched_count: u.watched_videos.len(),
                created_at: u.created_at,
            }
        })
        .collect();

    Ok(Json(views))
}

/// Delete a user account.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    state.db.delete_user(&user_id).await?;
    tracing::info!(user_id = %user_id, "User deleted");

    Ok(Json(DeleteResponse { success: true }))
}
