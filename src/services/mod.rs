pub mod auth_service;
pub mod category_service;
pub mod media_service;
pub mod menu_service;
pub mod order_service;
pub mod product_service;
pub mod restaurant_service;
