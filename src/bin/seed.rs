//! Seeds a local database with a super-admin account and a demo tenant so
//! the dashboard and storefront have something to talk to.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use carta_api::{
    config::AppConfig,
    db::create_pool,
    dto::{
        categories::CreateCategoryRequest, products::CreateProductRequest,
        restaurants::CreateRestaurantRequest,
    },
    middleware::auth::AuthUser,
    models::{SystemRole, TenantRole},
    services::{auth_service, category_service, product_service, restaurant_service},
    state::AppState,
    storage::StorageClient,
};

const ADMIN_EMAIL: &str = "admin@carta.local";
const DEMO_SLUG: &str = "la-esquina";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        storage: StorageClient::new(&config.storage, Duration::from_secs(30)),
    };

    let admin_id = ensure_super_admin(&state).await?;
    let admin = AuthUser {
        user_id: admin_id,
        email: ADMIN_EMAIL.into(),
        system_role: SystemRole::SuperAdmin,
        role: None,
        restaurant_id: None,
        restaurant_slug: None,
    };

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM restaurants WHERE slug = $1")
        .bind(DEMO_SLUG)
        .fetch_optional(&pool)
        .await?;
    if existing.is_some() {
        tracing::info!(slug = DEMO_SLUG, "demo tenant already seeded");
        return Ok(());
    }

    let restaurant = restaurant_service::create_restaurant(
        &state,
        &admin,
        CreateRestaurantRequest {
            name: "La Esquina".into(),
            slug: DEMO_SLUG.into(),
            owner_email: "owner@carta.local".into(),
            owner_password: "owner-demo-1".into(),
            description: Some("Comida casera de barrio".into()),
            phone: Some("+54 11 4000 0000".into()),
            whatsapp_number: Some("+54 9 11 4000 0000".into()),
            address: Some("Av. Siempreviva 742".into()),
        },
    )
    .await?
    .data
    .expect("provisioning returns the restaurant");

    let owner = AuthUser {
        user_id: admin_id,
        email: ADMIN_EMAIL.into(),
        system_role: SystemRole::SuperAdmin,
        role: Some(TenantRole::Owner),
        restaurant_id: Some(restaurant.id),
        restaurant_slug: Some(restaurant.slug.clone()),
    };

    for (category_name, products) in [
        ("Bebidas", vec![("Limonada", 350i64), ("Agua con gas", 250)]),
        ("Platos", vec![("Milanesa con papas", 1250), ("Empanadas x6", 800)]),
        ("Postres", vec![("Flan casero", 450)]),
    ] {
        let category = category_service::create_category(
            &state,
            &owner,
            CreateCategoryRequest {
                name: category_name.into(),
            },
        )
        .await?
        .data
        .expect("created category");

        for (name, cents) in products {
            product_service::create_product(
                &state,
                &owner,
                CreateProductRequest {
                    category_id: category.id,
                    name: name.into(),
                    description: None,
                    price: Decimal::new(cents, 2),
                    image_url: None,
                    is_available: Some(true),
                },
            )
            .await?;
        }
    }

    tracing::info!(slug = DEMO_SLUG, "demo tenant seeded");
    Ok(())
}

async fn ensure_super_admin(state: &AppState) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(ADMIN_EMAIL)
        .fetch_optional(&state.pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let password_hash = auth_service::hash_password("super-admin-1")
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash, system_role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(ADMIN_EMAIL)
    .bind(password_hash)
    .bind(SystemRole::SuperAdmin)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(email = ADMIN_EMAIL, "super admin created");
    Ok(id)
}
