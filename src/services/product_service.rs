use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        categories::Entity as Categories,
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{CurrentUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductListQuery,
    state::AppState,
};

pub async fn find_product_by_id(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<Option<ProductModel>> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    Ok(product)
}

pub async fn list_products(
    state: &AppState,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, per_page, offset) = query.pagination().normalize();

    let mut finder = Products::find();
    if let Some(category_id) = query.category_id {
        finder = finder.filter(ProdCol::CategoryId.eq(category_id));
    }
    finder = finder.order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = find_product_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(ApiResponse::success("Product found", Product::from(product), None))
}

pub async fn create_product(
    state: &AppState,
    user: &CurrentUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let category_exists = Categories::find_by_id(payload.category_id)
        .one(&state.orm)
        .await?
        .is_some();
    if !category_exists {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        description: Set(payload.description),
        price: Set(payload.price),
        image_url: Set(payload.image_url),
        stock: Set(payload.stock),
        category_id: Set(payload.category_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_product_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if let Some(category_id) = payload.category_id {
        let category_exists = Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .is_some();
        if !category_exists {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
    }

    let mut active: ProductActive = existing.clone().into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }

    // A request with every field omitted changes nothing.
    let updated = if active.is_changed() {
        active.update(&state.orm).await?
    } else {
        existing
    };

    Ok(ApiResponse::success(
        "Product updated",
        Product::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(state: &AppState, user: &CurrentUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;

    let existing = find_product_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    existing.delete(&state.orm).await?;
    Ok(())
}
