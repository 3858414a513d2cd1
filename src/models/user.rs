//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Student account stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Internal ID (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// External login key; unique across users
    pub enrollment_id: String,
    /// College name
    pub college_name: String,
    /// Batch/cohort label
    pub batch: String,
    /// Bcrypt hash used to verify logins
    pub password_hash: String,
    /// AES-256-GCM copy for admin recovery display (base64 of nonce‖tag‖ciphertext)
    pub password_encrypted: String,
    /// Videos this user has watched, in watch order
    #[serde(default)]
    pub watched_videos: Vec<WatchedVideo>,
    /// When the account was created (ISO 8601)
    pub created_at: String,
}

/// One watch event. The referenced video may have been deleted since;
/// progress aggregation skips entries that no longer resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedVideo {
    pub video_id: String,
    /// When the video was first watched (ISO 8601)
    pub watched_at: String,
}
