use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderItemWithProduct, OrderList, OrderWithItems, UpdateOrderStatusRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{Order, Product},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &CurrentUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, per_page, offset) = pagination.normalize();

    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::Forbidden(
            "Not authorized to access this order".to_string(),
        ));
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, product)| OrderItemWithProduct {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            product: product.map(Product::from),
        })
        .collect();

    let data = OrderWithItems {
        order: Order::from(order),
        items,
    };
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

pub async fn create_order(state: &AppState, user: &CurrentUser) -> AppResult<ApiResponse<Order>> {
    // The whole checkout runs inside one transaction; dropping it on any
    // early return rolls everything back.
    let txn = state.orm.begin().await?;

    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .find_also_related(Products)
        .all(&txn)
        .await?;

    if cart_rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let mut total_price: i64 = 0;
    let mut lines = Vec::with_capacity(cart_rows.len());
    for (item, product) in cart_rows {
        let product = product
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart item without product")))?;
        total_price += product.price * i64::from(item.quantity);
        lines.push((item, product));
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        status: Set("pending".to_string()),
        total_price: Set(total_price),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    // Stock is not checked or decremented at checkout, so concurrent
    // orders can exceed the advertised stock.
    for (item, product) in lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(item.product_id)),
            quantity: Set(item.quantity),
            unit_price: Set(product.price),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "Order created",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    if !user.is_admin {
        return Err(AppError::Forbidden(
            "Not authorized to update orders".to_string(),
        ));
    }

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let Some(status) = payload.status else {
        return Ok(ApiResponse::success(
            "Order updated",
            Order::from(existing),
            Some(Meta::empty()),
        ));
    };
    validate_order_status(&status)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(status);
    let order = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

fn validate_order_status(status: &str) -> Result<(), AppError> {
    const VALID: [&str; 5] = ["pending", "paid", "shipped", "completed", "cancelled"];
    if VALID.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid order status".to_string()))
    }
}
