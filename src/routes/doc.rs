use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{EmailLoginRequest, LoginForm, RegisterRequest, Token},
        cart::{AddToCartRequest, CartItemWithProduct, CartResponse, UpdateCartItemRequest},
        categories::{
            CategoryList, CategoryWithProductsCount, CreateCategoryRequest, UpdateCategoryRequest,
        },
        favorites::{FavoriteWithProduct, FavoritesList},
        orders::{OrderItemWithProduct, OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList, ReviewWithUser},
        users::UpdateUserRequest,
    },
    models::{Category, Order, Product, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, favorites, health, orders, params, products, reviews, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::login_email,
        auth::profile,
        users::get_me,
        users::update_me,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::list_category_products,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::update_cart_item,
        cart::clear_cart,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite
    ),
    components(
        schemas(
            User,
            Product,
            Category,
            Order,
            RegisterRequest,
            LoginForm,
            EmailLoginRequest,
            Token,
            UpdateUserRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryWithProductsCount,
            CategoryList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemWithProduct,
            CartResponse,
            UpdateOrderStatusRequest,
            OrderItemWithProduct,
            OrderWithItems,
            OrderList,
            CreateReviewRequest,
            ReviewWithUser,
            ReviewList,
            FavoriteWithProduct,
            FavoritesList,
            params::Pagination,
            params::ProductListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartResponse>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CategoryList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "User profile endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Reviews", description = "Review endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
