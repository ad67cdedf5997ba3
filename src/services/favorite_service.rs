use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::favorites::{FavoriteWithProduct, FavoritesList},
    entity::{
        favorites::{ActiveModel as FavoriteActive, Column as FavCol, Entity as Favorites},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::Product,
    response::{ApiResponse, Meta},
    services::product_service::find_product_by_id,
    state::AppState,
};

pub async fn list_favorites(
    state: &AppState,
    user: &CurrentUser,
) -> AppResult<ApiResponse<FavoritesList>> {
    let rows = Favorites::find()
        .filter(FavCol::UserId.eq(user.id))
        .find_also_related(Products)
        .order_by_desc(FavCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut favorites = Vec::with_capacity(rows.len());
    for (favorite, product) in rows {
        // Favorites cascade with their product, so the join cannot miss.
        let product = product
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("favorite without product")))?;
        favorites.push(FavoriteWithProduct {
            id: favorite.id,
            user_id: favorite.user_id,
            product_id: favorite.product_id,
            product: Product::from(product),
        });
    }

    Ok(ApiResponse::success(
        "Favorites",
        FavoritesList { favorites },
        None,
    ))
}

pub async fn add_favorite(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<FavoriteWithProduct>> {
    let product = find_product_by_id(state, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let existing = Favorites::find()
        .filter(FavCol::UserId.eq(user.id))
        .filter(FavCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?;

    // Adding twice is a no-op that returns the existing row.
    let favorite = match existing {
        Some(favorite) => favorite,
        None => {
            FavoriteActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                product_id: Set(product_id),
                created_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    let data = FavoriteWithProduct {
        id: favorite.id,
        user_id: favorite.user_id,
        product_id: favorite.product_id,
        product: Product::from(product),
    };
    Ok(ApiResponse::success(
        "Added to favorites",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn remove_favorite(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
) -> AppResult<()> {
    let existing = Favorites::find()
        .filter(FavCol::UserId.eq(user.id))
        .filter(FavCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not in favorites".to_string()))?;

    existing.delete(&state.orm).await?;
    Ok(())
}
