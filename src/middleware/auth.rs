// SPDX-License-Identifier: MIT

//! JWT session authentication middleware.
//!
//! The session token travels in the `coursetrack_session` cookie (or a
//! Bearer header for non-browser clients) and carries the authenticated
//! principal's id, name, and role.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "coursetrack_session";

/// Session lifetime in seconds (7 days).
const SESSION_TTL_SECS: usize = 7 * 24 * 60 * 60;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_ADMIN: &str = "admin";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (internal user ID, or admin account ID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// "student" or "admin"
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated principal extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<Claims>(&token, &key, &validation).map_err(|_| AppError::Unauthorized)?;

    let auth_user = AuthUser {
        id: token_data.claims.sub,
        name: token_data.claims.name,
        role: token_data.claims.role,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that requires the admin role. Layered inside `require_auth`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AppError::Unauthorized)?;

    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Create a session JWT for a principal.
pub fn create_session_token(
    id: &str,
    name: &str,
    role: &str,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_round_trip() {
        let key = b"test_jwt_key_32_bytes_minimum!!!";
        let token = create_session_token("user-1", "Asha", ROLE_STUDENT, key).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(key),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, "user-1");
        assert_eq!(decoded.claims.name, "Asha");
        assert_eq!(decoded.claims.role, "student");
        assert!(decoded.claims.exp > decoded.claims.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_key() {
        let token = create_session_token("user-1", "Asha", ROLE_ADMIN, b"key-one-32-bytes-minimum!!!!!!!!")
            .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"key-two-32-bytes-minimum!!!!!!!!"),
            &Validation::new(Algorithm::HS256),
        );

        assert!(result.is_err());
    }
}
