use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{
        CreateOrderRequest, DashboardStats, OrderList, OrderListQuery, OrderView, OrderWithItems,
        UpdateOrderStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{DeliveryMethod, Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// History views are capped; the admin board only ever needs the recent tail.
const HISTORY_LIMIT: i64 = 100;

/// Public checkout. The order header and every item row are written in one
/// transaction, and the total is recomputed here from the product rows —
/// client-submitted figures are never trusted.
pub async fn create_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::Validation("Order has no items".into()));
    }
    if payload.items.iter().any(|i| i.quantity <= 0) {
        return Err(AppError::Validation("Item quantities must be positive".into()));
    }
    if payload.customer_name.trim().is_empty() {
        return Err(AppError::Validation("Customer name is required".into()));
    }
    if payload.delivery_method == DeliveryMethod::Delivery
        && payload
            .delivery_address
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
    {
        return Err(AppError::Validation(
            "Delivery orders require a delivery address".into(),
        ));
    }

    let restaurant: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM restaurants WHERE id = $1")
        .bind(payload.restaurant_id)
        .fetch_optional(&state.pool)
        .await?;
    if restaurant.is_none() {
        return Err(AppError::RestaurantNotFound);
    }

    let mut tx = state.pool.begin().await?;

    let product_ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
    let products: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE id = ANY($1) AND restaurant_id = $2")
            .bind(&product_ids)
            .bind(payload.restaurant_id)
            .fetch_all(&mut *tx)
            .await?;
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut lines: Vec<(Uuid, i32, Decimal, Decimal)> = Vec::with_capacity(payload.items.len());
    let mut total = Decimal::ZERO;
    for item in &payload.items {
        let product = by_id.get(&item.product_id).ok_or_else(|| {
            AppError::Validation(format!("Unknown product {}", item.product_id))
        })?;
        if !product.is_available {
            return Err(AppError::Validation(format!(
                "Product {} is not available",
                product.name
            )));
        }
        let subtotal = product.price * Decimal::from(item.quantity);
        total += subtotal;
        lines.push((product.id, item.quantity, product.price, subtotal));
    }

    let order: Order = sqlx::query_as(
        r#"
        INSERT INTO orders (
            id, restaurant_id, customer_name, customer_phone, status,
            payment_method, delivery_method, delivery_address, notes, total
        )
        VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.restaurant_id)
    .bind(payload.customer_name.trim())
    .bind(payload.customer_phone)
    .bind(payload.payment_method)
    .bind(payload.delivery_method)
    .bind(payload.delivery_address)
    .bind(payload.notes)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    for (product_id, quantity, unit_price, subtotal) in &lines {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(subtotal)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(order_id = %order.id, restaurant_id = %order.restaurant_id, %total, "order created");

    let items = fetch_items(&state.pool, order.id).await?;
    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let restaurant_id = user.tenant_id()?;

    let orders: Vec<Order> = match query.view {
        Some(OrderView::Active) => {
            sqlx::query_as(
                r#"
                SELECT * FROM orders
                WHERE restaurant_id = $1 AND status IN ('pending', 'preparing', 'ready')
                ORDER BY created_at DESC
                "#,
            )
            .bind(restaurant_id)
            .fetch_all(&state.pool)
            .await?
        }
        Some(OrderView::History) => {
            sqlx::query_as(
                r#"
                SELECT * FROM orders
                WHERE restaurant_id = $1 AND status IN ('delivered', 'cancelled')
                ORDER BY created_at DESC
                LIMIT $2
                "#,
            )
            .bind(restaurant_id)
            .bind(HISTORY_LIMIT)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT * FROM orders WHERE restaurant_id = $1 ORDER BY created_at DESC",
            )
            .bind(restaurant_id)
            .fetch_all(&state.pool)
            .await?
        }
    };

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order = fetch_items_grouped(&state.pool, &order_ids).await?;

    let items: Vec<OrderWithItems> = orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let restaurant_id = user.tenant_id()?;

    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(&state.pool)
            .await?;
    let order = order.ok_or(AppError::NotFound)?;

    let items = fetch_items(&state.pool, order.id).await?;
    Ok(ApiResponse::success(
        "Order",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

/// Status changes follow the lifecycle table on `OrderStatus`; re-asserting
/// the current status is an idempotent no-op. The write is guarded by an
/// optimistic version check so concurrent updates surface as a conflict
/// instead of silently overwriting each other.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let restaurant_id = user.tenant_id()?;

    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(&state.pool)
            .await?;
    let order = order.ok_or(AppError::NotFound)?;

    if let Some(version) = payload.version {
        if version != order.version {
            return Err(AppError::VersionConflict);
        }
    }

    if payload.status == order.status {
        return Ok(ApiResponse::success("Order status unchanged", order, Some(Meta::empty())));
    }

    if !order.status.can_transition_to(payload.status) {
        return Err(AppError::IllegalTransition {
            from: order.status,
            to: payload.status,
        });
    }

    let updated: Option<Order> = sqlx::query_as(
        r#"
        UPDATE orders
        SET status = $1, version = version + 1, updated_at = now()
        WHERE id = $2 AND restaurant_id = $3 AND version = $4
        RETURNING *
        "#,
    )
    .bind(payload.status)
    .bind(id)
    .bind(restaurant_id)
    .bind(order.version)
    .fetch_optional(&state.pool)
    .await?;

    // Zero rows here means the version moved between our read and write.
    let updated = updated.ok_or(AppError::VersionConflict)?;

    tracing::info!(
        order_id = %updated.id,
        from = %order.status,
        to = %updated.status,
        "order status changed"
    );

    Ok(ApiResponse::success(
        "Order status updated",
        updated,
        Some(Meta::empty()),
    ))
}

/// Aggregates for the admin dashboard. Cancelled orders are excluded from
/// both the count and the revenue sum; the average ticket stays a client
/// derivation from these two figures.
pub async fn dashboard_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardStats>> {
    let restaurant_id = user.tenant_id()?;

    let (total_orders, total_revenue, active_orders): (i64, Decimal, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(total), 0),
               COUNT(*) FILTER (WHERE status IN ('pending', 'preparing', 'ready'))
        FROM orders
        WHERE restaurant_id = $1 AND status <> 'cancelled'
        "#,
    )
    .bind(restaurant_id)
    .fetch_one(&state.pool)
    .await?;

    let recent_orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders WHERE restaurant_id = $1 ORDER BY created_at DESC LIMIT 5",
    )
    .bind(restaurant_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Dashboard stats",
        DashboardStats {
            total_orders,
            total_revenue,
            active_orders,
            recent_orders,
        },
        Some(Meta::empty()),
    ))
}

/// Item rows joined with the live product for display names; a deleted
/// product leaves the name null.
async fn fetch_items(pool: &DbPool, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items: Vec<OrderItem> = sqlx::query_as(
        r#"
        SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
               oi.quantity, oi.unit_price, oi.subtotal, oi.created_at
        FROM order_items oi
        LEFT JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = $1
        ORDER BY oi.created_at ASC, oi.id ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

async fn fetch_items_grouped(
    pool: &DbPool,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let items: Vec<OrderItem> = sqlx::query_as(
        r#"
        SELECT oi.id, oi.order_id, oi.product_id, p.name AS product_name,
               oi.quantity, oi.unit_price, oi.subtotal, oi.created_at
        FROM order_items oi
        LEFT JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.created_at ASC, oi.id ASC
        "#,
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}
