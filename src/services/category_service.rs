use std::collections::HashMap;

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        categories::{
            CategoryList, CategoryWithProductsCount, CreateCategoryRequest, UpdateCategoryRequest,
        },
        products::ProductList,
    },
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CatCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{CurrentUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

// The ancestor walk refuses chains longer than this, so a corrupted
// hierarchy cannot loop forever.
const MAX_CATEGORY_DEPTH: usize = 32;

pub async fn find_category_by_id(
    state: &AppState,
    category_id: Uuid,
) -> AppResult<Option<CategoryModel>> {
    let category = Categories::find_by_id(category_id).one(&state.orm).await?;
    Ok(category)
}

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, per_page, offset) = pagination.normalize();

    let total = Categories::find().count(&state.orm).await? as i64;

    let categories = Categories::find()
        .order_by_asc(CatCol::Name)
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    // One grouped query covers the counts for the whole page.
    let counts: Vec<(Uuid, i64)> = Products::find()
        .select_only()
        .column(ProdCol::CategoryId)
        .column_as(ProdCol::Id.count(), "cnt")
        .group_by(ProdCol::CategoryId)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

    let items = categories
        .into_iter()
        .map(|category| CategoryWithProductsCount {
            products_count: counts.get(&category.id).copied().unwrap_or(0),
            id: category.id,
            name: category.name,
            parent_id: category.parent_id,
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let category = find_category_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(ApiResponse::success(
        "Category found",
        Category::from(category),
        None,
    ))
}

pub async fn list_category_products(
    state: &AppState,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let category_exists = find_category_by_id(state, id).await?.is_some();
    if !category_exists {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let (page, per_page, offset) = pagination.normalize();

    let finder = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .order_by_desc(ProdCol::CreatedAt);

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

pub async fn create_category(
    state: &AppState,
    user: &CurrentUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    if let Some(parent_id) = payload.parent_id {
        let parent_exists = find_category_by_id(state, parent_id).await?.is_some();
        if !parent_exists {
            return Err(AppError::NotFound("Parent category not found".to_string()));
        }
    }

    ensure_name_free(state, &payload.name).await?;

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        parent_id: Set(payload.parent_id),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_category_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    if let Some(parent_id) = payload.parent_id {
        if parent_id == id {
            return Err(AppError::BadRequest(
                "Category cannot be its own parent".to_string(),
            ));
        }

        let parent_exists = find_category_by_id(state, parent_id).await?.is_some();
        if !parent_exists {
            return Err(AppError::NotFound("Parent category not found".to_string()));
        }

        ensure_not_descendant(state, id, parent_id).await?;
    }

    if let Some(name) = &payload.name {
        if name != &existing.name {
            ensure_name_free(state, name).await?;
        }
    }

    let mut active: CategoryActive = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(parent_id) = payload.parent_id {
        active.parent_id = Set(Some(parent_id));
    }

    // A request with every field omitted changes nothing.
    let updated = if active.is_changed() {
        active.update(&state.orm).await?
    } else {
        existing
    };

    Ok(ApiResponse::success(
        "Category updated",
        Category::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(state: &AppState, user: &CurrentUser, id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;

    let existing = find_category_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let children = Categories::find()
        .filter(CatCol::ParentId.eq(id))
        .count(&state.orm)
        .await?;
    if children > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete category with subcategories".to_string(),
        ));
    }

    let products = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if products > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete category with products".to_string(),
        ));
    }

    existing.delete(&state.orm).await?;
    Ok(())
}

async fn ensure_name_free(state: &AppState, name: &str) -> AppResult<()> {
    let taken = Categories::find()
        .filter(CatCol::Name.eq(name))
        .one(&state.orm)
        .await?
        .is_some();
    if taken {
        return Err(AppError::BadRequest(
            "Category name already exists".to_string(),
        ));
    }
    Ok(())
}

/// Walk the ancestor chain of the proposed parent. Reaching the category
/// being moved means the move would close a cycle.
async fn ensure_not_descendant(
    state: &AppState,
    category_id: Uuid,
    parent_id: Uuid,
) -> AppResult<()> {
    let mut cursor = Some(parent_id);
    let mut depth = 0;

    while let Some(current) = cursor {
        if current == category_id {
            return Err(AppError::BadRequest(
                "Category cannot be moved under one of its own subcategories".to_string(),
            ));
        }
        depth += 1;
        if depth > MAX_CATEGORY_DEPTH {
            return Err(AppError::BadRequest(
                "Category hierarchy too deep".to_string(),
            ));
        }
        cursor = Categories::find_by_id(current)
            .one(&state.orm)
            .await?
            .and_then(|category| category.parent_id);
    }

    Ok(())
}
