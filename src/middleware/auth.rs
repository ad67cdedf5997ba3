use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::Claims,
    entity::{self, Users},
    error::{AppError, AppResult},
    state::AppState,
};

/// The authenticated user behind a request, resolved from the bearer
/// token against the database so deactivated accounts are cut off
/// immediately, not at token expiry.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

pub fn ensure_admin(user: &CurrentUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden("Not enough permissions".to_string()));
    }
    Ok(())
}

pub fn create_access_token(config: &AppConfig, email: &str) -> AppResult<String> {
    encode_token(config, email, "access", config.access_token_expire_minutes)
}

pub fn create_refresh_token(config: &AppConfig, email: &str) -> AppResult<String> {
    encode_token(config, email, "refresh", config.refresh_token_expire_minutes)
}

fn encode_token(
    config: &AppConfig,
    email: &str,
    token_type: &str,
    expire_minutes: i64,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::minutes(expire_minutes))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set token expiration")))?;

    let claims = Claims {
        sub: email.to_string(),
        exp: expiration.timestamp() as usize,
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn credentials_error() -> AppError {
    AppError::Unauthorized("Could not validate credentials".to_string())
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or_else(credentials_error)?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| credentials_error())?;

        // Refresh tokens carry the same claims but never authenticate requests.
        if decoded.claims.token_type != "access" {
            return Err(credentials_error());
        }

        let user = Users::find()
            .filter(entity::users::Column::Email.eq(decoded.claims.sub.as_str()))
            .one(&state.orm)
            .await?
            .ok_or_else(credentials_error)?;

        if !user.is_active {
            return Err(AppError::Forbidden("Inactive user".to_string()));
        }

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            username: user.username,
            is_admin: user.is_admin,
        })
    }
}
