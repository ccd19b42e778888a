use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;
use uuid::Uuid;

use crate::controllers::ApiError;
use crate::models::Role;
use crate::AppState;

/// Caller identity resolved from HTTP Basic credentials.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Same as [`AuthUser`], but only admins get through.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

// Splits "Basic base64(email:password)" into its parts
fn basic_credentials(parts: &Parts) -> Option<(String, String)> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    let encoded = auth_header.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    let (email, password) = credentials.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let (email, password) = basic_credentials(parts).ok_or_else(ApiError::unauthorized)?;

        let user = state
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| {
                tracing::error!("auth: user lookup failed for {}: {:?}", email, e);
                ApiError::internal()
            })?
            .ok_or_else(ApiError::unauthorized)?;

        // bcrypt is deliberately slow, keep it off the async workers
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|_| ApiError::internal())?
            .unwrap_or(false);

        if !verified {
            return Err(ApiError::unauthorized());
        }

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Admin role required"));
        }
        Ok(AdminUser(user))
    }
}
