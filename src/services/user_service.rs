use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use validator::Validate;

use crate::{
    dto::users::UpdateUserRequest,
    entity::{self, Users},
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::User,
    response::ApiResponse,
    services::auth_service::hash_password,
    state::AppState,
};

pub async fn get_me(state: &AppState, user: &CurrentUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success("OK", User::from(model), None))
}

pub async fn update_me(
    state: &AppState,
    user: &CurrentUser,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;

    let model = Users::find_by_id(user.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(email) = &payload.email {
        if email != &model.email {
            let taken = Users::find()
                .filter(entity::users::Column::Email.eq(email.as_str()))
                .one(&state.orm)
                .await?
                .is_some();
            if taken {
                return Err(AppError::BadRequest("Email already registered".to_string()));
            }
        }
    }

    if let Some(username) = &payload.username {
        if username != &model.username {
            let taken = Users::find()
                .filter(entity::users::Column::Username.eq(username.as_str()))
                .one(&state.orm)
                .await?
                .is_some();
            if taken {
                return Err(AppError::BadRequest("Username already taken".to_string()));
            }
        }
    }

    let mut active: entity::users::ActiveModel = model.clone().into();
    if let Some(email) = payload.email {
        active.email = Set(email);
    }
    if let Some(username) = payload.username {
        active.username = Set(username);
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }

    // A request with every field omitted changes nothing.
    let updated = if active.is_changed() {
        active.update(&state.orm).await?
    } else {
        model
    };

    Ok(ApiResponse::success("User updated", User::from(updated), None))
}
