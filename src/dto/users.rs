use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Fields left out of the request stay unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub username: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
}
