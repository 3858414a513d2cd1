// SPDX-License-Identifier: MIT

//! Concurrency test for watch-event recording.
//!
//! Exercises the transactional add-if-absent path: concurrent watch events
//! for the same (user, video) pair must not produce duplicate entries or
//! lose updates.

use coursetrack::models::User;
use coursetrack::time_utils::now_rfc3339;

mod common;

#[tokio::test]
async fn test_concurrent_watches_record_each_video_once() {
    require_emulator!();
    let db = common::test_db().await;

    let user = User {
        id: format!("user-{}", uuid::Uuid::new_v4()),
        name: "Ravi".to_string(),
        enrollment_id: format!("EN-{}", uuid::Uuid::new_v4()),
        college_name: "State College".to_string(),
        batch: "2026".to_string(),
        password_hash: "hash".to_string(),
        password_encrypted: "blob".to_string(),
        watched_videos: Vec::new(),
        created_at: now_rfc3339(),
    };
    db.create_user(&user).await.expect("create user");

    // Same video watched from several tasks at once, plus several distinct
    // videos in flight simultaneously. If the transaction's read set were
    // empty, two writers would read the same stale list and the later commit
    // would silently drop the earlier append.
    let shared_video = format!("video-{}", uuid::Uuid::new_v4());
    let distinct_videos: Vec<String> = (0..4)
        .map(|_| format!("video-{}", uuid::Uuid::new_v4()))
        .collect();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let db = db.clone();
        let user_id = user.id.clone();
        let video_id = shared_video.clone();
        handles.push(tokio::spawn(async move {
            db.add_watched_video_if_absent(&user_id, &video_id, &now_rfc3339())
                .await
        }));
    }
    for video_id in &distinct_videos {
        let db = db.clone();
        let user_id = user.id.clone();
        let video_id = video_id.clone();
        handles.push(tokio::spawn(async move {
            db.add_watched_video_if_absent(&user_id, &video_id, &now_rfc3339())
                .await
        }));
    }

    for handle in handles {
        handle.await.expect("task").expect("watch recorded");
    }

    let stored = db.get_user(&user.id).await.expect("read").expect("exists");
    let count_of = |id: &str| {
        stored
            .watched_videos
            .iter()
            .filter(|w| w.video_id == id)
            .count()
    };

    assert_eq!(count_of(&shared_video), 1, "duplicate watch entries recorded");
    for video_id in &distinct_videos {
        assert_eq!(count_of(video_id), 1, "concurrent append lost");
    }
    assert_eq!(
        stored.watched_videos.len(),
        1 + distinct_videos.len(),
        "watched list holds exactly one entry per video"
    );

    db.delete_user(&user.id).await.expect("cleanup");
}
