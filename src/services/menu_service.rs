use rust_decimal::prelude::ToPrimitive;

use crate::{
    dto::menu::{MenuCategory, MenuProduct, PublicMenu},
    error::{AppError, AppResult},
    models::{Category, Product, Restaurant},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Public storefront menu for a tenant, addressed by slug. Categories and
/// available products are fetched concurrently and nested in memory; the
/// per-category filter is O(categories × products), fine at menu scale.
pub async fn get_public_menu(state: &AppState, slug: &str) -> AppResult<ApiResponse<PublicMenu>> {
    let restaurant: Option<Restaurant> =
        sqlx::query_as("SELECT * FROM restaurants WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&state.pool)
            .await?;
    let restaurant = restaurant.ok_or(AppError::RestaurantNotFound)?;

    let categories_query = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE restaurant_id = $1 ORDER BY sort_order ASC, created_at ASC",
    )
    .bind(restaurant.id)
    .fetch_all(&state.pool);

    let products_query = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE restaurant_id = $1 AND is_available ORDER BY name ASC",
    )
    .bind(restaurant.id)
    .fetch_all(&state.pool);

    let (categories, products) = tokio::try_join!(categories_query, products_query)?;

    let menu = PublicMenu {
        restaurant: restaurant.into(),
        categories: build_menu_tree(categories, products),
    };

    Ok(ApiResponse::success("Menu", menu, Some(Meta::empty())))
}

pub(crate) fn build_menu_tree(categories: Vec<Category>, products: Vec<Product>) -> Vec<MenuCategory> {
    categories
        .into_iter()
        .map(|category| {
            let items = products
                .iter()
                .filter(|p| p.category_id == category.id)
                .map(|p| MenuProduct {
                    id: p.id,
                    name: p.name.clone(),
                    description: p.description.clone(),
                    price: p.price.to_f64().unwrap_or_default(),
                    image_url: p.image_url.clone(),
                })
                .collect();
            MenuCategory {
                id: category.id,
                name: category.name,
                sort_order: category.sort_order,
                products: items,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::build_menu_tree;
    use crate::models::{Category, Product};

    fn category(restaurant_id: Uuid, name: &str, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            restaurant_id,
            name: name.into(),
            sort_order,
            created_at: Utc::now(),
        }
    }

    fn product(restaurant_id: Uuid, category_id: Uuid, name: &str, cents: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            restaurant_id,
            category_id,
            name: name.into(),
            description: None,
            price: Decimal::new(cents, 2),
            image_url: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn every_product_lands_exactly_once_under_its_category() {
        let tenant = Uuid::new_v4();
        let drinks = category(tenant, "Bebidas", 1);
        let mains = category(tenant, "Platos", 2);
        let products = vec![
            product(tenant, drinks.id, "Limonada", 350),
            product(tenant, mains.id, "Milanesa", 1250),
            product(tenant, mains.id, "Empanadas", 800),
        ];

        let tree = build_menu_tree(vec![drinks.clone(), mains.clone()], products);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].products.len(), 1);
        assert_eq!(tree[1].products.len(), 2);
        let total: usize = tree.iter().map(|c| c.products.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn categories_without_products_are_kept_empty() {
        let tenant = Uuid::new_v4();
        let empty = category(tenant, "Postres", 1);
        let tree = build_menu_tree(vec![empty], vec![]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].products.is_empty());
    }

    #[test]
    fn prices_become_plain_numbers() {
        let tenant = Uuid::new_v4();
        let drinks = category(tenant, "Bebidas", 1);
        let products = vec![product(tenant, drinks.id, "Limonada", 350)];
        let tree = build_menu_tree(vec![drinks], products);
        assert_eq!(tree[0].products[0].price, 3.5);
    }
}
