#![allow(dead_code)]

use chrono::Utc;
use marketplace_api::{
    config::AppConfig,
    db,
    dto::auth::RegisterRequest,
    entity::{
        categories::ActiveModel as CategoryActive,
        products::{ActiveModel as ProductActive, Model as ProductModel},
    },
    middleware::auth::CurrentUser,
    services::auth_service,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use uuid::Uuid;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        access_token_expire_minutes: 60,
        refresh_token_expire_minutes: 120,
        allowed_origins: vec!["*".to_string()],
    }
}

/// In-memory SQLite with every table created from the entities. The pool
/// is capped at one connection; each connection would otherwise get its
/// own empty database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let orm = Database::connect(options).await?;
    db::setup_schema(&orm).await?;

    Ok(AppState {
        orm,
        config: test_config(),
    })
}

pub async fn register_user(
    state: &AppState,
    email: &str,
    username: &str,
    is_admin: bool,
) -> anyhow::Result<CurrentUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "password123".to_string(),
            is_active: None,
            is_admin: Some(is_admin),
        },
    )
    .await?;

    let user = resp.data.expect("registered user");
    Ok(CurrentUser {
        id: user.id,
        email: user.email,
        username: user.username,
        is_admin: user.is_admin,
    })
}

pub async fn seed_category(state: &AppState, name: &str) -> anyhow::Result<Uuid> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        parent_id: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(category.id)
}

pub async fn seed_product(
    state: &AppState,
    category_id: Uuid,
    title: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<ProductModel> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        description: Set(format!("{title} description")),
        price: Set(price),
        image_url: Set(None),
        stock: Set(stock),
        category_id: Set(category_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}
