use marketplace_api::{
    dto::reviews::CreateReviewRequest,
    error::AppError,
    routes::params::Pagination,
    services::{favorite_service, review_service},
};
use uuid::Uuid;

mod common;

fn first_page() -> Pagination {
    Pagination {
        page: Some(1),
        per_page: Some(20),
    }
}

#[tokio::test]
async fn review_submit_overwrite_and_delete_flow() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let alice = common::register_user(&state, "alice@example.com", "alice", false).await?;
    let bob = common::register_user(&state, "bob@example.com", "bob", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    let submitted = review_service::create_review(
        &state,
        &alice,
        product.id,
        CreateReviewRequest {
            rating: 5,
            comment: "Crisp highs, deep lows".to_string(),
        },
    )
    .await?;
    assert_eq!(submitted.message, "Review submitted");

    let review = submitted.data.expect("review");
    assert_eq!(review.rating, 5);
    assert_eq!(review.username, "alice");

    // A second submit from the same user replaces the first review.
    let replaced = review_service::create_review(
        &state,
        &alice,
        product.id,
        CreateReviewRequest {
            rating: 2,
            comment: "Broke after a week".to_string(),
        },
    )
    .await?
    .data
    .expect("review");
    assert_eq!(replaced.id, review.id);
    assert_eq!(replaced.rating, 2);

    review_service::create_review(
        &state,
        &bob,
        product.id,
        CreateReviewRequest {
            rating: 4,
            comment: "Good value".to_string(),
        },
    )
    .await?;

    let listed = review_service::list_reviews(&state, product.id, first_page()).await?;
    assert_eq!(listed.message, "Reviews");
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(2));

    let items = listed.data.expect("reviews").items;
    assert_eq!(items.len(), 2);
    let alices = items
        .iter()
        .find(|r| r.user_id == alice.id)
        .expect("alice's review");
    assert_eq!(alices.rating, 2);
    assert_eq!(alices.username, "alice");

    review_service::delete_review(&state, &alice, product.id).await?;

    let listed = review_service::list_reviews(&state, product.id, first_page()).await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(1));

    let err = review_service::delete_review(&state, &alice, product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Review not found"));

    Ok(())
}

#[tokio::test]
async fn review_rejects_bad_ratings_and_unknown_products() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    for rating in [0, 6] {
        let err = review_service::create_review(
            &state,
            &user,
            product.id,
            CreateReviewRequest {
                rating,
                comment: "Out of range".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    let err = review_service::create_review(
        &state,
        &user,
        Uuid::new_v4(),
        CreateReviewRequest {
            rating: 3,
            comment: "No such product".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Product not found"));

    let err = review_service::list_reviews(&state, Uuid::new_v4(), first_page())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Product not found"));

    Ok(())
}

#[tokio::test]
async fn favorites_add_is_idempotent() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let headphones = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;
    let charger = common::seed_product(&state, category_id, "Charger", 500, 3).await?;

    let added = favorite_service::add_favorite(&state, &user, headphones.id).await?;
    assert_eq!(added.message, "Added to favorites");
    let first = added.data.expect("favorite");

    // Adding again returns the same row instead of a duplicate.
    let again = favorite_service::add_favorite(&state, &user, headphones.id)
        .await?
        .data
        .expect("favorite");
    assert_eq!(again.id, first.id);

    favorite_service::add_favorite(&state, &user, charger.id).await?;

    let listed = favorite_service::list_favorites(&state, &user).await?;
    assert_eq!(listed.message, "Favorites");

    let favorites = listed.data.expect("favorites").favorites;
    assert_eq!(favorites.len(), 2);
    // Newest first.
    assert_eq!(favorites[0].product_id, charger.id);
    assert_eq!(favorites[0].product.title, "Charger");

    favorite_service::remove_favorite(&state, &user, headphones.id).await?;

    let favorites = favorite_service::list_favorites(&state, &user)
        .await?
        .data
        .expect("favorites")
        .favorites;
    assert_eq!(favorites.len(), 1);

    let err = favorite_service::remove_favorite(&state, &user, headphones.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Product not in favorites"));

    let err = favorite_service::add_favorite(&state, &user, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Product not found"));

    Ok(())
}

#[tokio::test]
async fn favorites_are_scoped_per_user() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let alice = common::register_user(&state, "alice@example.com", "alice", false).await?;
    let bob = common::register_user(&state, "bob@example.com", "bob", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    favorite_service::add_favorite(&state, &alice, product.id).await?;

    let bobs = favorite_service::list_favorites(&state, &bob).await?;
    assert!(bobs.data.expect("favorites").favorites.is_empty());

    Ok(())
}
