use marketplace_api::{
    dto::{cart::AddToCartRequest, orders::UpdateOrderStatusRequest, products::UpdateProductRequest},
    error::AppError,
    routes::params::Pagination,
    services::{cart_service, order_service, product_service},
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
async fn checkout_creates_order_and_empties_cart() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let headphones = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;
    let charger = common::seed_product(&state, category_id, "Charger", 500, 3).await?;

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: headphones.id,
            quantity: 2,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: charger.id,
            quantity: 1,
        },
    )
    .await?;

    let created = order_service::create_order(&state, &user).await?;
    assert_eq!(created.message, "Order created");

    let order = created.data.expect("order");
    assert_eq!(order.user_id, user.id);
    assert_eq!(order.status, "pending");
    assert_eq!(order.total_price, 2500);

    // Checkout drains the cart.
    let cart = cart_service::get_cart(&state, &user).await?;
    assert!(cart.data.expect("cart").items.is_empty());

    // Stock stays untouched; fulfilment happens elsewhere.
    let product = product_service::get_product(&state, headphones.id).await?;
    assert_eq!(product.data.expect("product").stock, 10);

    let fetched = order_service::get_order(&state, &user, order.id).await?;
    assert_eq!(fetched.message, "Order found");

    let fetched = fetched.data.expect("order with items");
    assert_eq!(fetched.order.id, order.id);
    assert_eq!(fetched.items.len(), 2);

    let line = fetched
        .items
        .iter()
        .find(|item| item.product_id == Some(headphones.id))
        .expect("headphones line");
    assert_eq!(line.quantity, 2);
    assert_eq!(line.unit_price, 1000);
    assert_eq!(
        line.product.as_ref().map(|p| p.title.as_str()),
        Some("Headphones")
    );

    Ok(())
}

#[tokio::test]
async fn checkout_rejects_empty_cart() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;

    let err = order_service::create_order(&state, &user).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Cart is empty"));

    Ok(())
}

#[tokio::test]
async fn order_keeps_price_snapshots() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::register_user(&state, "admin@example.com", "admin", true).await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;
    let order = order_service::create_order(&state, &user)
        .await?
        .data
        .expect("order");

    product_service::update_product(
        &state,
        &admin,
        product.id,
        UpdateProductRequest {
            title: None,
            description: None,
            price: Some(9999),
            image_url: None,
            stock: None,
            category_id: None,
        },
    )
    .await?;

    let fetched = order_service::get_order(&state, &user, order.id)
        .await?
        .data
        .expect("order with items");
    assert_eq!(fetched.order.total_price, 2000);
    assert_eq!(fetched.items[0].unit_price, 1000);

    // Removing the product from the catalog keeps the paid line intact.
    product_service::delete_product(&state, &admin, product.id).await?;

    let fetched = order_service::get_order(&state, &user, order.id)
        .await?
        .data
        .expect("order with items");
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].unit_price, 1000);
    assert!(fetched.items[0].product.is_none());

    Ok(())
}

#[tokio::test]
async fn order_access_is_owner_or_admin() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::register_user(&state, "admin@example.com", "admin", true).await?;
    let alice = common::register_user(&state, "alice@example.com", "alice", false).await?;
    let bob = common::register_user(&state, "bob@example.com", "bob", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    cart_service::add_to_cart(
        &state,
        &alice,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;
    let order = order_service::create_order(&state, &alice)
        .await?
        .data
        .expect("order");

    let err = order_service::get_order(&state, &bob, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg == "Not authorized to access this order"));

    order_service::get_order(&state, &admin, order.id).await?;

    // Listing only ever shows the caller's own orders.
    let bobs = order_service::list_orders(&state, &bob, first_page()).await?;
    assert_eq!(bobs.meta.as_ref().and_then(|m| m.total), Some(0));
    assert!(bobs.data.expect("orders").items.is_empty());

    let err = order_service::get_order(&state, &alice, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Order not found"));

    Ok(())
}

#[tokio::test]
async fn admin_updates_order_status() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::register_user(&state, "admin@example.com", "admin", true).await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;
    let order = order_service::create_order(&state, &user)
        .await?
        .data
        .expect("order");

    let err = order_service::update_order_status(
        &state,
        &user,
        order.id,
        UpdateOrderStatusRequest {
            status: Some("shipped".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg == "Not authorized to update orders"));

    let updated = order_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: Some("shipped".to_string()),
        },
    )
    .await?;
    assert_eq!(updated.message, "Order updated");
    assert_eq!(updated.data.expect("order").status, "shipped");

    let err = order_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: Some("teleported".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "Invalid order status"));

    // Omitting the status leaves the order as it is.
    let unchanged = order_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest { status: None },
    )
    .await?;
    assert_eq!(unchanged.data.expect("order").status, "shipped");

    let err = order_service::update_order_status(
        &state,
        &admin,
        Uuid::new_v4(),
        UpdateOrderStatusRequest {
            status: Some("paid".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Order not found"));

    Ok(())
}

#[tokio::test]
async fn orders_list_newest_first() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::register_user(&state, "user@example.com", "user", false).await?;
    let category_id = common::seed_category(&state, "Electronics").await?;
    let product = common::seed_product(&state, category_id, "Headphones", 1000, 10).await?;

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;
    let first = order_service::create_order(&state, &user)
        .await?
        .data
        .expect("order");

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;
    let second = order_service::create_order(&state, &user)
        .await?
        .data
        .expect("order");

    let listed = order_service::list_orders(&state, &user, first_page()).await?;
    assert_eq!(listed.message, "Orders");
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(2));

    let items = listed.data.expect("orders").items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, second.id);
    assert_eq!(items[1].id, first.id);

    Ok(())
}
