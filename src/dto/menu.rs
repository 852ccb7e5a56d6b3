use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{MenuMode, Restaurant};

/// Storefront-facing restaurant block: branding and ordering flags only.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicRestaurant {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub theme_mode: Option<String>,
    pub menu_mode: MenuMode,
    pub menu_pdf_url: Option<String>,
    pub enable_pickup: bool,
    pub enable_delivery: bool,
}

impl From<Restaurant> for PublicRestaurant {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            slug: r.slug,
            name: r.name,
            description: r.description,
            logo_url: r.logo_url,
            cover_url: r.cover_url,
            address: r.address,
            phone: r.phone,
            whatsapp_number: r.whatsapp_number,
            theme_mode: r.theme_mode,
            menu_mode: r.menu_mode,
            menu_pdf_url: r.menu_pdf_url,
            enable_pickup: r.enable_pickup,
            enable_delivery: r.enable_delivery,
        }
    }
}

/// Prices in the public payload are plain JSON numbers; the catalog is a
/// 2dp currency, so the float round-trip is an accepted simplification.
#[derive(Debug, Serialize, ToSchema)]
pub struct MenuProduct {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuCategory {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub products: Vec<MenuProduct>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicMenu {
    pub restaurant: PublicRestaurant,
    pub categories: Vec<MenuCategory>,
}
