use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::cart::{AddToCartRequest, CartItemWithProduct, CartResponse, UpdateCartItemRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::Product,
    response::ApiResponse,
    services::product_service::find_product_by_id,
    state::AppState,
};

/// Load the cart with products joined in; the total is recomputed from
/// current prices on every call.
async fn load_cart(state: &AppState, user_id: Uuid) -> AppResult<CartResponse> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .find_also_related(Products)
        .order_by_desc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    let mut total_price: i64 = 0;
    for (item, product) in rows {
        // Cart rows cascade with their product, so the join cannot miss.
        let product = product
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart item without product")))?;
        total_price += product.price * i64::from(item.quantity);
        items.push(CartItemWithProduct {
            id: item.id,
            user_id: item.user_id,
            product_id: item.product_id,
            quantity: item.quantity,
            product: Product::from(product),
        });
    }

    Ok(CartResponse { items, total_price })
}

pub async fn get_cart(state: &AppState, user: &CurrentUser) -> AppResult<ApiResponse<CartResponse>> {
    let cart = load_cart(state, user.id).await?;
    Ok(ApiResponse::success("Cart", cart, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &CurrentUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartResponse>> {
    payload.validate()?;

    let product = find_product_by_id(state, payload.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if product.stock < payload.quantity {
        return Err(AppError::BadRequest(
            "Not enough stock available".to_string(),
        ));
    }

    let existing = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .filter(CartCol::ProductId.eq(payload.product_id))
        .one(&state.orm)
        .await?;

    match existing {
        Some(item) => {
            let quantity = item.quantity + payload.quantity;
            let mut active: CartActive = item.into();
            active.quantity = Set(quantity);
            active.update(&state.orm).await?;
        }
        None => {
            CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                product_id: Set(payload.product_id),
                quantity: Set(payload.quantity),
                created_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?;
        }
    }

    let cart = load_cart(state, user.id).await?;
    Ok(ApiResponse::success("Added to cart", cart, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartResponse>> {
    let existing = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .filter(CartCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found in cart".to_string()))?;

    existing.delete(&state.orm).await?;

    let cart = load_cart(state, user.id).await?;
    Ok(ApiResponse::success("Removed from cart", cart, None))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartResponse>> {
    payload.validate()?;

    let existing = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .filter(CartCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found in cart".to_string()))?;

    let product = find_product_by_id(state, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if payload.quantity > product.stock {
        return Err(AppError::BadRequest(
            "Not enough stock available".to_string(),
        ));
    }

    let mut active: CartActive = existing.into();
    active.quantity = Set(payload.quantity);
    active.update(&state.orm).await?;

    let cart = load_cart(state, user.id).await?;
    Ok(ApiResponse::success("Cart updated", cart, None))
}

pub async fn clear_cart(
    state: &AppState,
    user: &CurrentUser,
) -> AppResult<ApiResponse<CartResponse>> {
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.id))
        .exec(&state.orm)
        .await?;

    let cart = load_cart(state, user.id).await?;
    Ok(ApiResponse::success("Cart cleared", cart, None))
}
