use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Restaurant, SystemRole, TenantRole};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; deliberately excludes the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub system_role: SystemRole,
    pub role: Option<TenantRole>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: AuthenticatedUser,
    /// Active tenant selected at login; absent for super-admins with no
    /// membership.
    pub restaurant: Option<Restaurant>,
}
