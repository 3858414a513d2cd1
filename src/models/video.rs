//! Video catalog record.

use serde::{Deserialize, Serialize};

/// A catalog entry, created only after the full upload pipeline succeeds.
/// Immutable afterwards except for admin deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// Internal ID (also used as document ID)
    pub id: String,
    /// Lecture topic/title
    pub topic: String,
    /// Free-text course grouping key; the set of distinct values across
    /// videos is the course list
    pub course: String,
    pub description: String,
    pub summary: String,
    /// Public URL of the uploaded video
    pub video_url: String,
    /// Public URL of the derived 320x240 still frame
    pub thumbnail_url: String,
    /// When the record was created (ISO 8601)
    pub created_at: String,
}
