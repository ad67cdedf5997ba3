use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub parent_id: Option<Uuid>,
}

/// Omitted fields stay unchanged; moving a category back to the root is
/// not exposed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithProductsCount {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// Products directly in this category; subcategories do not add to it.
    pub products_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<CategoryWithProductsCount>)]
    pub items: Vec<CategoryWithProductsCount>,
}
