// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (credential store + per-user watch history)
//! - Videos (catalog records written by the upload pipeline)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{User, Video, WatchedVideo};
use std::collections::BTreeSet;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Result of one watch-recording transaction attempt.
enum WatchOutcome {
    Recorded,
    AlreadyWatched,
    UserMissing,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by internal ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by the external enrollment ID used for login.
    pub async fn find_user_by_enrollment_id(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<User>, AppError> {
        let enrollment_id = enrollment_id.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("enrollment_id").eq(enrollment_id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.pop())
    }

    /// Create a user record keyed by its internal ID.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a user account.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Watch History ───────────────────────────────────────────

    /// Atomically append a watch entry unless the video is already present.
    ///
    /// Runs inside `run_transaction`: the read goes through the
    /// transaction-bound client handed to the closure, so the user document
    /// is in the transaction's read set and a concurrent writer aborts the
    /// commit. Aborted commits are retried with fresh data, so no append is
    /// lost under contention.
    ///
    /// Returns `true` if the entry was appended, `false` if it already
    /// existed (idempotent duplicate).
    pub async fn add_watched_video_if_absent(
        &self,
        user_id: &str,
        video_id: &str,
        watched_at: &str,
    ) -> Result<bool, AppError> {
        let user_id = user_id.to_string();
        let video_id = video_id.to_string();
        let watched_at = watched_at.to_string();

        let outcome = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let user_id = user_id.clone();
                let video_id = video_id.clone();
                let watched_at = watched_at.clone();
                Box::pin(async move {
                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(WatchOutcome::UserMissing);
                    };

                    if user.watched_videos.iter().any(|w| w.video_id == video_id) {
                        return Ok(WatchOutcome::AlreadyWatched);
                    }

                    user.watched_videos.push(WatchedVideo {
                        video_id,
                        watched_at,
                    });

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user_id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok(WatchOutcome::Recorded)
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Watch transaction failed: {}", e)))?;

        match outcome {
            WatchOutcome::UserMissing => {
                Err(AppError::NotFound(format!("User {} not found", user_id)))
            }
            WatchOutcome::AlreadyWatched => {
                tracing::debug!(user_id, video_id, "Video already watched (idempotent skip)");
                Ok(false)
            }
            WatchOutcome::Recorded => {
                tracing::info!(user_id, video_id, "Watch event recorded");
                Ok(true)
            }
        }
    }

    // ─── Video Catalog ───────────────────────────────────────────

    /// Get a video by ID.
    pub async fn get_video(&self, video_id: &str) -> Result<Option<Video>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::VIDEOS)
            .obj()
            .one(video_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a catalog record. Called only after both remote uploads
    /// succeeded.
    pub async fn create_video(&self, video: &Video) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VIDEOS)
            .document_id(&video.id)
            .object(video)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List videos, optionally filtered to one course, newest first.
    pub async fn list_videos(&self, course: Option<&str>) -> Result<Vec<Video>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::VIDEOS);

        let query = if let Some(course) = course {
            let course = course.to_string();
            query.filter(move |q| q.for_all([q.field("course").eq(course.clone())]))
        } else {
            query
        };

        query
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The distinct set of course labels across all videos.
    ///
    /// Courses are not stored entities; every read re-derives the set from a
    /// full scan of the catalog. Fine at this data volume; a cache would have
    /// to be invalidated on every video create/delete.
    pub async fn distinct_courses(&self) -> Result<Vec<String>, AppError> {
        let videos: Vec<Video> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::VIDEOS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let courses: BTreeSet<String> = videos.into_iter().map(|v| v.course).collect();
        Ok(courses.into_iter().collect())
    }

    /// Delete a catalog record.
    pub async fn delete_video(&self, video_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::VIDEOS)
            .document_id(video_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
