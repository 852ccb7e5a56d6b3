use uuid::Uuid;

use crate::{
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_products(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProductList>> {
    let restaurant_id = user.tenant_id()?;
    let items: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE restaurant_id = $1 ORDER BY name ASC")
            .bind(restaurant_id)
            .fetch_all(&state.pool)
            .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let restaurant_id = user.tenant_id()?;
    ensure_category_owned(state, payload.category_id, restaurant_id).await?;

    let product: Product = sqlx::query_as(
        r#"
        INSERT INTO products (id, restaurant_id, category_id, name, description, price, image_url, is_available)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(restaurant_id)
    .bind(payload.category_id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.image_url)
    .bind(payload.is_available.unwrap_or(true))
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let restaurant_id = user.tenant_id()?;

    if let Some(category_id) = payload.category_id {
        ensure_category_owned(state, category_id, restaurant_id).await?;
    }

    let product: Option<Product> = sqlx::query_as(
        r#"
        UPDATE products
        SET category_id = COALESCE($3, category_id),
            name = COALESCE($4, name),
            description = COALESCE($5, description),
            price = COALESCE($6, price),
            image_url = COALESCE($7, image_url),
            is_available = COALESCE($8, is_available),
            updated_at = now()
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(payload.category_id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.price)
    .bind(payload.image_url)
    .bind(payload.is_available)
    .fetch_optional(&state.pool)
    .await?;

    let product = product.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product updated",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let restaurant_id = user.tenant_id()?;

    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Products may only reference categories of the same restaurant; enforced
/// here rather than by a DB constraint.
async fn ensure_category_owned(
    state: &AppState,
    category_id: Uuid,
    restaurant_id: Uuid,
) -> AppResult<()> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM categories WHERE id = $1 AND restaurant_id = $2")
            .bind(category_id)
            .bind(restaurant_id)
            .fetch_optional(&state.pool)
            .await?;

    if exists.is_none() {
        return Err(AppError::Validation(
            "Category does not belong to this restaurant".into(),
        ));
    }
    Ok(())
}
