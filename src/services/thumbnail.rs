// SPDX-License-Identifier: MIT

//! Thumbnail derivation via an external ffmpeg process.
//!
//! Extracts a single still frame at a fixed 320x240 size, letting the tool
//! pick its default frame. One blocking shot per call; the pipeline awaits
//! completion before moving on.

use crate::error::AppError;
use std::path::Path;
use tokio::process::Command;

/// Fixed thumbnail size.
const THUMBNAIL_SIZE: &str = "320x240";

/// Wrapper around the ffmpeg binary.
#[derive(Clone)]
pub struct Thumbnailer {
    ffmpeg_path: Option<String>,
}

impl Thumbnailer {
    pub fn new(ffmpeg_path: &str) -> Self {
        Self {
            ffmpeg_path: Some(ffmpeg_path.to_string()),
        }
    }

    /// Create a mock thumbnailer for testing (no ffmpeg required).
    ///
    /// Fails on empty input the way ffmpeg fails on undecodable media, and
    /// writes a stub frame otherwise.
    pub fn new_mock() -> Self {
        Self { ffmpeg_path: None }
    }

    /// Capture one still frame from `input` into `output`.
    ///
    /// Fails if the input is not decodable media or the process exits
    /// non-zero.
    pub async fn derive(&self, input: &Path, output: &Path) -> Result<(), AppError> {
        let Some(ffmpeg) = self.ffmpeg_path.as_ref() else {
            return self.derive_mock(input, output).await;
        };

        let result = Command::new(ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-frames:v", "1", "-s", THUMBNAIL_SIZE])
            .arg(output)
            .output()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to spawn ffmpeg: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::Upstream(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.lines().last().unwrap_or_default()
            )));
        }

        tracing::debug!(output = %output.display(), "Thumbnail derived");
        Ok(())
    }

    async fn derive_mock(&self, input: &Path, output: &Path) -> Result<(), AppError> {
        let data = tokio::fs::read(input)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to read {}: {}", input.display(), e)))?;

        if data.is_empty() {
            return Err(AppError::Upstream(format!(
                "{}: not a decodable media file",
                input.display()
            )));
        }

        // JPEG SOI marker as a stand-in frame
        tokio::fs::write(output, [0xFF, 0xD8, 0xFF, 0xD9])
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Failed to write {}: {}", output.display(), e))
            })?;
        Ok(())
    }
}
