use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{DeliveryMethod, Order, OrderItem, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Public checkout payload. Unit prices and the total are not part of the
/// request; they are derived from the product rows at creation time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub payment_method: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    /// Version observed by the client; when present the update is rejected
    /// with a conflict if the row moved on since.
    pub version: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderView {
    Active,
    History,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub view: Option<OrderView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Orders counted and summed here exclude cancelled ones.
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub active_orders: i64,
    pub recent_orders: Vec<Order>,
}
