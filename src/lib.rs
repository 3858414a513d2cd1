// SPDX-License-Identifier: MIT

//! Coursetrack: backend API for a course-video learning platform.
//!
//! Students sign up, watch course videos, and track per-course progress.
//! Admins upload videos (staged locally, thumbnailed via ffmpeg, pushed to
//! object storage) and manage user accounts.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ObjectStore, PasswordVault, Thumbnailer, UploadPipeline};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub password_vault: PasswordVault,
    pub object_store: ObjectStore,
    pub upload_pipeline: UploadPipeline,
}

impl AppState {
    /// Assemble application state from its parts.
    pub fn new(
        config: Config,
        db: FirestoreDb,
        password_vault: PasswordVault,
        object_store: ObjectStore,
        thumbnailer: Thumbnailer,
    ) -> Self {
        let upload_pipeline = UploadPipeline::new(
            db.clone(),
            object_store.clone(),
            thumbnailer,
            config.temp_dir.clone(),
            config.upload_timeout_secs,
        );

        Self {
            config,
            db,
            password_vault,
            object_store,
            upload_pipeline,
        }
    }
}
