use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{MenuMode, Restaurant};

/// Transactional tenant provisioning: the restaurant plus its OWNER binding,
/// creating the owner user when the email is unknown.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    pub name: String,
    pub slug: String,
    pub owner_email: String,
    pub owner_password: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub address: Option<String>,
}

/// Partial patch: absent fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub cover_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub theme_mode: Option<String>,
    pub menu_mode: Option<MenuMode>,
    pub menu_pdf_url: Option<String>,
    pub enable_pickup: Option<bool>,
    pub enable_delivery: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantList {
    pub items: Vec<Restaurant>,
}
