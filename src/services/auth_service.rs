use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::auth::{RegisterRequest, Token},
    entity::{self, Users},
    error::{AppError, AppResult},
    middleware::auth::{create_access_token, create_refresh_token},
    models::User,
    response::ApiResponse,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn find_user_by_email(
    state: &AppState,
    email: &str,
) -> AppResult<Option<entity::users::Model>> {
    let user = Users::find()
        .filter(entity::users::Column::Email.eq(email))
        .one(&state.orm)
        .await?;
    Ok(user)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;

    if find_user_by_email(state, &payload.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let username_taken = Users::find()
        .filter(entity::users::Column::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if username_taken {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = entity::users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        username: Set(payload.username),
        password_hash: Set(password_hash),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_admin: Set(payload.is_admin.unwrap_or(false)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub async fn login_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> AppResult<ApiResponse<Token>> {
    let user = find_user_by_email(state, email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Incorrect email or password".to_string()))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Incorrect email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Inactive user".to_string()));
    }

    let access_token = create_access_token(&state.config, &user.email)?;
    let refresh_token = create_refresh_token(&state.config, &user.email)?;

    let token = Token {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
    };

    Ok(ApiResponse::success("Logged in", token, None))
}
