use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteWithProduct {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoritesList {
    pub favorites: Vec<FavoriteWithProduct>,
}
