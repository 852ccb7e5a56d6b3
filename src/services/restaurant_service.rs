use uuid::Uuid;

use crate::{
    dto::restaurants::{CreateRestaurantRequest, RestaurantList, UpdateRestaurantRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_super_admin},
    models::{Restaurant, SystemRole, TenantRole, User},
    response::{ApiResponse, Meta},
    services::auth_service::hash_password,
    state::AppState,
};

fn ensure_own_tenant_or_super_admin(user: &AuthUser, restaurant_id: Uuid) -> AppResult<()> {
    if user.is_super_admin() || user.restaurant_id == Some(restaurant_id) {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

pub async fn get_own_restaurant(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant_id = user.tenant_id()?;
    fetch_restaurant(state, restaurant_id).await
}

pub async fn get_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_own_tenant_or_super_admin(user, id)?;
    fetch_restaurant(state, id).await
}

async fn fetch_restaurant(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant: Option<Restaurant> =
        sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    let restaurant = restaurant.ok_or(AppError::RestaurantNotFound)?;
    Ok(ApiResponse::success("Restaurant", restaurant, Some(Meta::empty())))
}

pub async fn update_own_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant_id = user.tenant_id()?;
    update_restaurant_row(state, restaurant_id, payload).await
}

pub async fn update_restaurant(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_own_tenant_or_super_admin(user, id)?;
    update_restaurant_row(state, id, payload).await
}

/// COALESCE-style patch: absent fields keep their stored value (this
/// endpoint cannot clear a field back to NULL).
async fn update_restaurant_row(
    state: &AppState,
    id: Uuid,
    payload: UpdateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    let restaurant: Option<Restaurant> = sqlx::query_as(
        r#"
        UPDATE restaurants
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            logo_url = COALESCE($4, logo_url),
            cover_url = COALESCE($5, cover_url),
            address = COALESCE($6, address),
            phone = COALESCE($7, phone),
            whatsapp_number = COALESCE($8, whatsapp_number),
            theme_mode = COALESCE($9, theme_mode),
            menu_mode = COALESCE($10, menu_mode),
            menu_pdf_url = COALESCE($11, menu_pdf_url),
            enable_pickup = COALESCE($12, enable_pickup),
            enable_delivery = COALESCE($13, enable_delivery),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.logo_url)
    .bind(payload.cover_url)
    .bind(payload.address)
    .bind(payload.phone)
    .bind(payload.whatsapp_number)
    .bind(payload.theme_mode)
    .bind(payload.menu_mode)
    .bind(payload.menu_pdf_url)
    .bind(payload.enable_pickup)
    .bind(payload.enable_delivery)
    .fetch_optional(&state.pool)
    .await?;

    let restaurant = restaurant.ok_or(AppError::RestaurantNotFound)?;
    Ok(ApiResponse::success(
        "Restaurant updated",
        restaurant,
        Some(Meta::empty()),
    ))
}

pub async fn list_restaurants(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RestaurantList>> {
    ensure_super_admin(user)?;

    let items: Vec<Restaurant> =
        sqlx::query_as("SELECT * FROM restaurants ORDER BY created_at DESC")
            .fetch_all(&state.pool)
            .await?;

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Restaurants",
        RestaurantList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// Tenant provisioning: hash the password, look up or insert the owner
/// user, insert the restaurant, bind the owner — all in one transaction.
/// Dropping the transaction on any error rolls the whole sequence back.
pub async fn create_restaurant(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRestaurantRequest,
) -> AppResult<ApiResponse<Restaurant>> {
    ensure_super_admin(user)?;

    let slug = payload.slug.trim().to_lowercase();
    if slug.is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::Validation("Name and slug are required".into()));
    }
    if payload.owner_password.len() < 8 {
        return Err(AppError::Validation(
            "Owner password must be at least 8 characters".into(),
        ));
    }

    let password_hash = hash_password(&payload.owner_password)?;

    let mut tx = state.pool.begin().await?;

    let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM restaurants WHERE slug = $1")
        .bind(&slug)
        .fetch_optional(&mut *tx)
        .await?;
    if taken.is_some() {
        return Err(AppError::Validation("Slug is already in use".into()));
    }

    let owner: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(payload.owner_email.as_str())
        .fetch_optional(&mut *tx)
        .await?;
    let owner = match owner {
        Some(existing) => existing,
        None => {
            sqlx::query_as(
                r#"
                INSERT INTO users (id, email, password_hash, system_role)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(payload.owner_email.as_str())
            .bind(&password_hash)
            .bind(SystemRole::User)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    let restaurant: Restaurant = sqlx::query_as(
        r#"
        INSERT INTO restaurants (id, slug, name, description, phone, whatsapp_number, address)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&slug)
    .bind(payload.name.trim())
    .bind(payload.description)
    .bind(payload.phone)
    .bind(payload.whatsapp_number)
    .bind(payload.address)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_tenants (id, user_id, restaurant_id, role)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner.id)
    .bind(restaurant.id)
    .bind(TenantRole::Owner)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        restaurant_id = %restaurant.id,
        slug = %restaurant.slug,
        owner_id = %owner.id,
        "tenant provisioned"
    );

    Ok(ApiResponse::success(
        "Restaurant created",
        restaurant,
        Some(Meta::empty()),
    ))
}
