use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CategoryList>> {
    let restaurant_id = user.tenant_id()?;
    let items: Vec<Category> = sqlx::query_as(
        "SELECT * FROM categories WHERE restaurant_id = $1 ORDER BY sort_order ASC, created_at ASC",
    )
    .bind(restaurant_id)
    .fetch_all(&state.pool)
    .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// New categories append at the end of the menu: max(sort_order) + 1,
/// starting at 1 for an empty menu.
pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let restaurant_id = user.tenant_id()?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Category name is required".into()));
    }

    let category: Category = sqlx::query_as(
        r#"
        INSERT INTO categories (id, restaurant_id, name, sort_order)
        VALUES (
            $1, $2, $3,
            (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM categories WHERE restaurant_id = $2)
        )
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(restaurant_id)
    .bind(payload.name.trim())
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let restaurant_id = user.tenant_id()?;

    let category: Option<Category> = sqlx::query_as(
        r#"
        UPDATE categories
        SET name = COALESCE($3, name),
            sort_order = COALESCE($4, sort_order)
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(payload.name)
    .bind(payload.sort_order)
    .fetch_optional(&state.pool)
    .await?;

    let category = category.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Category updated",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let restaurant_id = user.tenant_id()?;

    let (product_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE category_id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .fetch_one(&state.pool)
            .await?;
    if product_count > 0 {
        return Err(AppError::Validation(
            "Category still has products; move or delete them first".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
