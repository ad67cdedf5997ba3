use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList, ReviewWithUser},
    entity::{
        reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::product_service::find_product_by_id,
    state::AppState,
};

fn review_with_user(review: ReviewModel, username: String) -> ReviewWithUser {
    ReviewWithUser {
        id: review.id,
        user_id: review.user_id,
        product_id: review.product_id,
        rating: review.rating,
        comment: review.comment,
        created_at: review.created_at.with_timezone(&Utc),
        username,
    }
}

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let product_exists = find_product_by_id(state, product_id).await?.is_some();
    if !product_exists {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let (page, per_page, offset) = pagination.normalize();

    let finder = Reviews::find().filter(ReviewCol::ProductId.eq(product_id));

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Users)
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for (review, user) in rows {
        // Reviews cascade with their author, so the join cannot miss.
        let user =
            user.ok_or_else(|| AppError::Internal(anyhow::anyhow!("review without author")))?;
        items.push(review_with_user(review, user.username));
    }

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

pub async fn create_review(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<ReviewWithUser>> {
    payload.validate()?;

    let product_exists = find_product_by_id(state, product_id).await?.is_some();
    if !product_exists {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let existing = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.id))
        .filter(ReviewCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?;

    // A second submit replaces the earlier review instead of adding one.
    let review = match existing {
        Some(review) => {
            let mut active: ReviewActive = review.into();
            active.rating = Set(payload.rating);
            active.comment = Set(payload.comment);
            active.update(&state.orm).await?
        }
        None => {
            ReviewActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                product_id: Set(product_id),
                rating: Set(payload.rating),
                comment: Set(payload.comment),
                created_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    let data = review_with_user(review, user.username.clone());
    Ok(ApiResponse::success(
        "Review submitted",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn delete_review(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
) -> AppResult<()> {
    let product_exists = find_product_by_id(state, product_id).await?.is_some();
    if !product_exists {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let review = Reviews::find()
        .filter(ReviewCol::UserId.eq(user.id))
        .filter(ReviewCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    review.delete(&state.orm).await?;
    Ok(())
}
