//! Per-course watch progress derived from a user's watch history.
//!
//! The aggregation is a single pass over the video set and a single pass
//! over the watched list, O(courses + watched), instead of re-scanning the
//! watched list once per course.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{Video, WatchedVideo};

/// Watch progress for one course.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseProgress {
    pub course: String,
    pub total_videos: u32,
    pub watched_videos: u32,
    /// Rounded percentage, 0 for a course with no videos
    pub progress: u32,
}

/// Compute per-course progress for one user.
///
/// Watched entries whose video no longer exists are skipped, not errors.
/// Courses are returned in lexicographic order.
pub fn aggregate(videos: &[Video], watched: &[WatchedVideo]) -> Vec<CourseProgress> {
    // Index the catalog: totals per course plus a video-id -> course lookup.
    let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
    let mut course_of: HashMap<&str, &str> = HashMap::new();
    for video in videos {
        *totals.entry(&video.course).or_insert(0) += 1;
        course_of.insert(&video.id, &video.course);
    }

    // One pass over the watch history, resolving each entry to its course.
    let mut watched_counts: HashMap<&str, u32> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in watched {
        if !seen.insert(&entry.video_id) {
            continue;
        }
        if let Some(course) = course_of.get(entry.video_id.as_str()) {
            *watched_counts.entry(course).or_insert(0) += 1;
        }
    }

    totals
        .into_iter()
        .map(|(course, total)| {
            let watched = watched_counts.get(course).copied().unwrap_or(0);
            CourseProgress {
                course: course.to_string(),
                total_videos: total,
                watched_videos: watched,
                progress: percentage(watched, total),
            }
        })
        .collect()
}

/// Rounded percentage; a zero total yields 0 rather than a division error.
fn percentage(watched: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((100.0 * watched as f64) / total as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_video(id: &str, course: &str) -> Video {
        Video {
            id: id.to_string(),
            topic: format!("Topic {}", id),
            course: course.to_string(),
            description: String::new(),
            summary: String::new(),
            video_url: format!("https://cdn.example.com/videos/{}.mp4", id),
            thumbnail_url: format!("https://cdn.example.com/thumbnails/{}.jpg", id),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn watch(id: &str) -> WatchedVideo {
        WatchedVideo {
            video_id: id.to_string(),
            watched_at: "2026-01-02T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_two_of_four_watched_is_fifty() {
        let videos = vec![
            make_video("v1", "Algebra"),
            make_video("v2", "Algebra"),
            make_video("v3", "Algebra"),
            make_video("v4", "Algebra"),
        ];
        let watched = vec![watch("v1"), watch("v3")];

        let progress = aggregate(&videos, &watched);

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].course, "Algebra");
        assert_eq!(progress[0].total_videos, 4);
        assert_eq!(progress[0].watched_videos, 2);
        assert_eq!(progress[0].progress, 50);
    }

    #[test]
    fn test_empty_catalog_yields_no_courses() {
        let progress = aggregate(&[], &[watch("v1")]);
        assert!(progress.is_empty());
    }

    #[test]
    fn test_zero_total_never_divides() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(3, 0), 0);
    }

    #[test]
    fn test_dangling_watch_entries_are_skipped() {
        let videos = vec![make_video("v1", "Physics"), make_video("v2", "Physics")];
        // "deleted" was watched before the video was removed from the catalog
        let watched = vec![watch("v1"), watch("deleted")];

        let progress = aggregate(&videos, &watched);

        assert_eq!(progress[0].watched_videos, 1);
        assert_eq!(progress[0].progress, 50);
    }

    #[test]
    fn test_multiple_courses_sorted() {
        let videos = vec![
            make_video("v1", "Physics"),
            make_video("v2", "Algebra"),
            make_video("v3", "Algebra"),
        ];
        let watched = vec![watch("v2")];

        let progress = aggregate(&videos, &watched);

        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].course, "Algebra");
        assert_eq!(progress[0].progress, 50);
        assert_eq!(progress[1].course, "Physics");
        assert_eq!(progress[1].progress, 0);
    }

    #[test]
    fn test_rounding() {
        let videos = vec![
            make_video("v1", "Chem"),
            make_video("v2", "Chem"),
            make_video("v3", "Chem"),
        ];
        let watched = vec![watch("v1")];

        // 1/3 rounds to 33
        let progress = aggregate(&videos, &watched);
        assert_eq!(progress[0].progress, 33);

        // 2/3 rounds to 67
        let watched = vec![watch("v1"), watch("v2")];
        let progress = aggregate(&videos, &watched);
        assert_eq!(progress[0].progress, 67);
    }

    #[test]
    fn test_duplicate_watch_entries_count_once() {
        let videos = vec![make_video("v1", "Chem"), make_video("v2", "Chem")];
        let watched = vec![watch("v1"), watch("v1")];

        let progress = aggregate(&videos, &watched);
        assert_eq!(progress[0].watched_videos, 1);
        assert_eq!(progress[0].progress, 50);
    }
}
