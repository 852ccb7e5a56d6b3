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
        auth::{AuthenticatedUser, LoginRequest, LoginResponse},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        files::UploadResponse,
        menu::{MenuCategory, MenuProduct, PublicMenu, PublicRestaurant},
        orders::{
            CreateOrderItemRequest, CreateOrderRequest, DashboardStats, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        restaurants::{CreateRestaurantRequest, RestaurantList, UpdateRestaurantRequest},
    },
    models::{
        Category, DeliveryMethod, MenuMode, Order, OrderItem, OrderStatus, Product, Restaurant,
        SystemRole, TenantRole,
    },
    response::{ApiResponse, Meta},
    routes::{auth, categories, files, health, menu, orders, products, restaurants},
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
        auth::login,
        menu::public_menu,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::list_orders,
        orders::dashboard_stats,
        orders::get_order,
        orders::update_status,
        restaurants::list_restaurants,
        restaurants::create_restaurant,
        restaurants::get_own_restaurant,
        restaurants::update_own_restaurant,
        restaurants::get_restaurant,
        restaurants::update_restaurant,
        files::upload_file
    ),
    components(
        schemas(
            Restaurant,
            Category,
            Product,
            Order,
            OrderItem,
            OrderStatus,
            DeliveryMethod,
            MenuMode,
            SystemRole,
            TenantRole,
            LoginRequest,
            LoginResponse,
            AuthenticatedUser,
            PublicMenu,
            PublicRestaurant,
            MenuCategory,
            MenuProduct,
            CategoryList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            ProductList,
            CreateProductRequest,
            UpdateProductRequest,
            CreateOrderRequest,
            CreateOrderItemRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            DashboardStats,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            RestaurantList,
            UploadResponse,
            Meta,
            ApiResponse<LoginResponse>,
            ApiResponse<PublicMenu>,
            ApiResponse<Restaurant>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<DashboardStats>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Menu", description = "Public storefront menu"),
        (name = "Categories", description = "Tenant menu categories"),
        (name = "Products", description = "Tenant products"),
        (name = "Orders", description = "Order lifecycle and dashboard stats"),
        (name = "Restaurants", description = "Tenant settings and provisioning"),
        (name = "Files", description = "Media uploads"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
