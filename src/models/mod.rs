// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod progress;
pub mod user;
pub mod video;

pub use progress::CourseProgress;
pub use user::{User, WatchedVideo};
pub use video::Video;
