// SPDX-License-Identifier: MIT

//! Signup, login, and logout routes.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_token, ROLE_ADMIN, ROLE_STUDENT, SESSION_COOKIE};
use crate::models::User;
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub enrollment_id: String,
    pub college_name: String,
    pub batch: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// Create a student account. The enrollment ID must be unique; a second
/// signup with the same ID is rejected.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    for (field, value) in [
        ("name", &req.name),
        ("enrollment_id", &req.enrollment_id),
        ("college_name", &req.college_name),
        ("batch", &req.batch),
        ("password", &req.password),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
    }

    let enrollment_id = req.enrollment_id.trim();
    if state
        .db
        .find_user_by_enrollment_id(enrollment_id)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(format!(
            "Enrollment ID {} is already registered",
            enrollment_id
        )));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        enrollment_id: enrollment_id.to_string(),
        college_name: req.college_name.trim().to_string(),
        batch: req.batch.trim().to_string(),
        password_hash: state.password_vault.hash(&req.password)?,
        password_encrypted: state.password_vault.encrypt(&req.password)?,
        watched_videos: Vec::new(),
        created_at: now_rfc3339(),
    };

    state.db.create_user(&user).await?;
    tracing::info!(user_id = %user.id, enrollment_id = %user.enrollment_id, "User signed up");

    session_reply(&state, jar, &user.id, &user.name, ROLE_STUDENT)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Enrollment ID for students, account ID for admins
    pub id: String,
    pub password: String,
}

/// Authenticate a principal and start a session.
///
/// Admin identities come from the injected configuration, students from the
/// credential store. Unknown identity and password mismatch are
/// indistinguishable to the caller.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if let Some(admin) = state
        .config
        .admin_accounts
        .iter()
        .find(|a| a.id == req.id)
    {
        if admin.password != req.password {
            return Err(AppError::Unauthorized);
        }
        tracing::info!(admin_id = %admin.id, "Admin logged in");
        return session_reply(&state, jar, &admin.id, &admin.name, ROLE_ADMIN);
    }

    let user = state
        .db
        .find_user_by_enrollment_id(req.id.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.password_vault.verify(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    session_reply(&state, jar, &user.id, &user.name, ROLE_STUDENT)
}

/// End the session by expiring the cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(serde_json::json!({ "success": true })))
}

fn session_reply(
    state: &Arc<AppState>,
    jar: CookieJar,
    id: &str,
    name: &str,
    role: &str,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_session_token(id, name, role, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session token creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        }),
    ))
}
