use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{EmailLoginRequest, LoginForm, RegisterRequest, Token},
    error::AppResult,
    middleware::auth::CurrentUser,
    models::User,
    response::ApiResponse,
    services::{auth_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login/email", post(login_email))
        .route("/profile", get(profile))
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Email or username already taken"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login user", body = ApiResponse<Token>),
        (status = 401, description = "Incorrect email or password"),
        (status = 403, description = "Inactive user"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<LoginForm>,
) -> AppResult<Json<ApiResponse<Token>>> {
    // OAuth2 password flow: the form's username field carries the email.
    let resp = auth_service::login_user(&state, &payload.username, &payload.password).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/login/email",
    request_body = EmailLoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<Token>),
        (status = 401, description = "Incorrect email or password"),
        (status = 403, description = "Inactive user"),
    ),
    tag = "Auth"
)]
pub async fn login_email(
    State(state): State<AppState>,
    Json(payload): Json<EmailLoginRequest>,
) -> AppResult<Json<ApiResponse<Token>>> {
    let resp = auth_service::login_user(&state, &payload.email, &payload.password).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<User>),
        (status = 401, description = "Could not validate credentials"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_me(&state, &user).await?;
    Ok(Json(resp))
}
