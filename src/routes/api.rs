// SPDX-License-Identifier: MIT

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{progress, CourseProgress, Video};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Routes requiring authentication (middleware applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/courses", get(get_courses))
        .route("/api/courses/{course}/videos", get(get_course_videos))
        .route("/api/progress", get(get_progress))
        .route("/api/videos/{video_id}/watch", post(record_watch))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

/// Get the current principal's profile. Admins have no stored record, so
/// their profile comes straight from the session claims.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    if user.is_admin() {
        return Ok(Json(ProfileResponse {
            id: user.id,
            name: user.name,
            role: user.role,
            enrollment_id: None,
            college_name: None,
            batch: None,
        }));
    }

    let profile = state
        .db
        .get_user(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

    Ok(Json(ProfileResponse {
        id: profile.id,
        name: profile.name,
        role: user.role,
        enrollment_id: Some(profile.enrollment_id),
        college_name: Some(profile.college_name),
        batch: Some(profile.batch),
    }))
}

// ─── Courses & Videos ────────────────────────────────────────

#[derive(Serialize)]
pub struct CoursesResponse {
    pub courses: Vec<String>,
}

/// List the distinct course labels across the catalog.
async fn get_courses(State(state): State<Arc<AppState>>) -> Result<Json<CoursesResponse>> {
    let courses = state.db.distinct_courses().await?;
    Ok(Json(CoursesResponse { courses }))
}

#[derive(Serialize)]
pub struct VideoSummary {
    pub id: String,
    pub topic: String,
    pub description: String,
    pub summary: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub created_at: String,
}

impl From<Video> for VideoSummary {
    fn from(v: Video) -> Self {
        Self {
            id: v.id,
            topic: v.topic,
            description: v.description,
            summary: v.summary,
            video_url: v.video_url,
            thumbnail_url: v.thumbnail_url,
            created_at: v.created_at,
        }
    }
}

/// List the videos for one course, newest first.
async fn get_course_videos(
    State(state): State<Arc<AppState>>,
    Path(course): Path<String>,
) -> Result<Json<Vec<VideoSummary>>> {
    let videos = state.db.list_videos(Some(&course)).await?;
    Ok(Json(videos.into_iter().map(VideoSummary::from).collect()))
}

// ─── Progress ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProgressResponse {
    pub courses: Vec<CourseProgress>,
}

/// Per-course watch progress for the current user.
async fn get_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProgressResponse>> {
    let profile = state
        .db
        .get_user(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

    let videos = state.db.list_videos(None).await?;
    let courses = progress::aggregate(&videos, &profile.watched_videos);

    tracing::debug!(
        user_id = %user.id,
        course_count = courses.len(),
        "Progress computed"
    );

    Ok(Json(ProgressResponse { courses }))
}

// ─── Watch Events ────────────────────────────────────────────

#[derive(Serialize)]
pub struct WatchResponse {
    pub watched: bool,
    /// false when this video was already in the watch history
    pub newly_recorded: bool,
}

/// Record that the current user watched a video.
///
/// Idempotent: a repeated watch of the same video adds nothing and is not
/// an error.
async fn record_watch(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> Result<Json<WatchResponse>> {
    state
        .db
        .get_video(&video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    let newly_recorded = state
        .db
        .add_watched_video_if_absent(&user.id, &video_id, &now_rfc3339())
        .await?;

    Ok(Json(WatchResponse {
        watched: true,
        newly_recorded,
    }))
}
