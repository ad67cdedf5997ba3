use marketplace_api::{
    dto::categories::{CreateCategoryRequest, UpdateCategoryRequest},
    error::AppError,
    routes::params::Pagination,
    services::category_service,
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
async fn category_tree_crud_flow() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::register_user(&state, "admin@example.com", "admin", true).await?;

    let root = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Electronics".to_string(),
            parent_id: None,
        },
    )
    .await?;
    assert_eq!(root.message, "Category created");
    let root = root.data.expect("root category");
    assert_eq!(root.parent_id, None);

    let child = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Audio".to_string(),
            parent_id: Some(root.id),
        },
    )
    .await?;
    let child = child.data.expect("child category");
    assert_eq!(child.parent_id, Some(root.id));

    common::seed_product(&state, child.id, "Speaker", 700, 5).await?;
    common::seed_product(&state, child.id, "Microphone", 300, 8).await?;

    // Counts cover direct products only; the parent stays at zero.
    let listed = category_service::list_categories(&state, first_page()).await?;
    assert_eq!(listed.message, "Categories");
    let items = listed.data.expect("categories").items;
    let audio = items.iter().find(|c| c.id == child.id).expect("child row");
    assert_eq!(audio.products_count, 2);
    let electronics = items.iter().find(|c| c.id == root.id).expect("root row");
    assert_eq!(electronics.products_count, 0);

    let fetched = category_service::get_category(&state, child.id).await?;
    assert_eq!(fetched.message, "Category found");
    assert_eq!(fetched.data.expect("category").name, "Audio");

    let products = category_service::list_category_products(&state, child.id, first_page()).await?;
    assert_eq!(products.meta.as_ref().and_then(|m| m.total), Some(2));
    assert_eq!(products.data.expect("products").items.len(), 2);

    let renamed = category_service::update_category(
        &state,
        &admin,
        child.id,
        UpdateCategoryRequest {
            name: Some("Audio Gear".to_string()),
            parent_id: None,
        },
    )
    .await?;
    assert_eq!(renamed.message, "Category updated");
    assert_eq!(renamed.data.expect("category").name, "Audio Gear");

    // Neither a category with products nor one with subcategories can go.
    let err = category_service::delete_category(&state, &admin, child.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Cannot delete category with products"));

    let err = category_service::delete_category(&state, &admin, root.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Cannot delete category with subcategories"));

    let empty = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Clearance".to_string(),
            parent_id: None,
        },
    )
    .await?;
    let empty = empty.data.expect("empty category");
    category_service::delete_category(&state, &admin, empty.id).await?;

    let err = category_service::get_category(&state, empty.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Category not found"));

    Ok(())
}

#[tokio::test]
async fn category_writes_require_admin() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;

    let err = category_service::create_category(
        &state,
        &user,
        CreateCategoryRequest {
            name: "Toys".to_string(),
            parent_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg == "Not enough permissions"));

    let err = category_service::update_category(
        &state,
        &user,
        category_id,
        UpdateCategoryRequest {
            name: Some("Gadgets".to_string()),
            parent_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = category_service::delete_category(&state, &user, category_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    Ok(())
}

#[tokio::test]
async fn category_names_stay_unique() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::register_user(&state, "admin@example.com", "admin", true).await?;
    common::seed_category(&state, "Electronics").await?;
    let books = common::seed_category(&state, "Books").await?;

    let err = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Electronics".to_string(),
            parent_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Category name already exists"));

    let err = category_service::update_category(
        &state,
        &admin,
        books,
        UpdateCategoryRequest {
            name: Some("Electronics".to_string()),
            parent_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Category name already exists"));

    // Renaming a category to its current name is not a collision.
    let unchanged = category_service::update_category(
        &state,
        &admin,
        books,
        UpdateCategoryRequest {
            name: Some("Books".to_string()),
            parent_id: None,
        },
    )
    .await?;
    assert_eq!(unchanged.data.expect("category").name, "Books");

    Ok(())
}

#[tokio::test]
async fn reparenting_rejects_cycles() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::register_user(&state, "admin@example.com", "admin", true).await?;

    // a -> b -> c, parent to child.
    let a = common::seed_category(&state, "A").await?;
    let b = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "B".to_string(),
            parent_id: Some(a),
        },
    )
    .await?
    .data
    .expect("b")
    .id;
    let c = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "C".to_string(),
            parent_id: Some(b),
        },
    )
    .await?
    .data
    .expect("c")
    .id;

    let err = category_service::update_category(
        &state,
        &admin,
        a,
        UpdateCategoryRequest {
            name: None,
            parent_id: Some(a),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Category cannot be its own parent"));

    // Moving the root under its grandchild would close a loop.
    let err = category_service::update_category(
        &state,
        &admin,
        a,
        UpdateCategoryRequest {
            name: None,
            parent_id: Some(c),
        },
    )
    .await
    .unwrap_err();
    assert!(
        matches!(err, AppError::BadRequest(ref msg) if msg == "Category cannot be moved under one of its own subcategories")
    );

    let err = category_service::update_category(
        &state,
        &admin,
        a,
        UpdateCategoryRequest {
            name: None,
            parent_id: Some(Uuid::new_v4()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Parent category not found"));

    // Sideways moves stay legal: c from under b to directly under a.
    let moved = category_service::update_category(
        &state,
        &admin,
        c,
        UpdateCategoryRequest {
            name: None,
            parent_id: Some(a),
        },
    )
    .await?;
    assert_eq!(moved.data.expect("category").parent_id, Some(a));

    Ok(())
}

#[tokio::test]
async fn category_products_listing_requires_category() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let err = category_service::list_category_products(&state, Uuid::new_v4(), first_page())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Category not found"));

    Ok(())
}
