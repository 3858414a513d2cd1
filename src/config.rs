//! Application configuration loaded once at startup from environment variables.
//!
//! Admin identities are part of this immutable struct and are passed
//! explicitly to the authentication layer, never read from ambient state
//! mid-request.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::env;
use std::path::PathBuf;

/// A static admin identity from configuration (not stored in the database).
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: String,
    pub password: String,
    pub name: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,

    /// S3 bucket for videos and thumbnails
    pub s3_bucket: String,
    /// S3 region
    pub s3_region: String,
    /// Custom S3 endpoint (MinIO/LocalStack); None for AWS
    pub s3_endpoint_url: Option<String>,

    /// Path to the ffmpeg binary
    pub ffmpeg_path: String,
    /// Local staging directory for uploads in flight
    pub temp_dir: PathBuf,
    /// Timeout applied to the transcode and remote-upload steps (seconds)
    pub upload_timeout_secs: u64,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// 32-byte AES-256-GCM key for the reversible password copy
    pub password_key: Vec<u8>,
    /// Static admin identities
    pub admin_accounts: Vec<AdminAccount>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `PW_SECRET_KEY` must be the base64 encoding of 32 random bytes.
    /// `ADMIN_ACCOUNTS` is a semicolon-separated list of `id:password:name`
    /// triples.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let password_key = BASE64
            .decode(env::var("PW_SECRET_KEY").map_err(|_| ConfigError::Missing("PW_SECRET_KEY"))?)
            .map_err(|_| ConfigError::Invalid("PW_SECRET_KEY is not valid base64"))?;
        if password_key.len() != 32 {
            return Err(ConfigError::Invalid("PW_SECRET_KEY must decode to 32 bytes"));
        }

        let admin_accounts = parse_admin_accounts(
            &env::var("ADMIN_ACCOUNTS").map_err(|_| ConfigError::Missing("ADMIN_ACCOUNTS"))?,
        )?;

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            s3_bucket: env::var("S3_BUCKET").map_err(|_| ConfigError::Missing("S3_BUCKET"))?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-west-1".to_string()),
            s3_endpoint_url: env::var("S3_ENDPOINT_URL").ok(),

            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            temp_dir: env::var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("coursetrack-uploads")),
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            password_key,
            admin_accounts,
        })
    }

    /// Fixed configuration for tests (no environment access).
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            s3_bucket: "test-bucket".to_string(),
            s3_region: "us-west-1".to_string(),
            s3_endpoint_url: None,
            ffmpeg_path: "ffmpeg".to_string(),
            temp_dir: std::env::temp_dir().join("coursetrack-test-uploads"),
            upload_timeout_secs: 5,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            password_key: vec![7u8; 32],
            admin_accounts: vec![AdminAccount {
                id: "admin1".to_string(),
                password: "admin_password".to_string(),
                name: "Test Admin".to_string(),
            }],
        }
    }
}

/// Parse `id:password:name` triples separated by semicolons.
fn parse_admin_accounts(raw: &str) -> Result<Vec<AdminAccount>, ConfigError> {
    raw.split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(password), Some(name))
                    if !id.is_empty() && !password.is_empty() =>
                {
                    Ok(AdminAccount {
                        id: id.trim().to_string(),
                        password: password.to_string(),
                        name: name.trim().to_string(),
                    })
                }
                _ => Err(ConfigError::Invalid(
                    "ADMIN_ACCOUNTS entries must be id:password:name",
                )),
            }
        })
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value: {0}")]
    Invalid(&'static str),
}
