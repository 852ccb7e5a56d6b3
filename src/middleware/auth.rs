use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{SystemRole, TenantRole},
    state::AppState,
};

/// JWT payload issued at login. The tenant context (`restaurant_id`,
/// `restaurant_slug`) is fixed at login time and trusted for the token's
/// 24h lifetime; membership is not re-checked per request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Option<TenantRole>,
    pub system_role: SystemRole,
    pub restaurant_id: Option<Uuid>,
    pub restaurant_slug: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub system_role: SystemRole,
    pub role: Option<TenantRole>,
    pub restaurant_id: Option<Uuid>,
    pub restaurant_slug: Option<String>,
}

impl AuthUser {
    pub fn is_super_admin(&self) -> bool {
        self.system_role == SystemRole::SuperAdmin
    }

    /// The active tenant for tenant-scoped routes. Super-admins without a
    /// membership carry no tenant and are rejected here.
    pub fn tenant_id(&self) -> Result<Uuid, AppError> {
        self.restaurant_id.ok_or(AppError::Forbidden)
    }
}

pub fn ensure_super_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_super_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?
            .trim();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?;

        let claims = decoded.claims;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            system_role: claims.system_role,
            role: claims.role,
            restaurant_id: claims.restaurant_id,
            restaurant_slug: claims.restaurant_slug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SystemRole, TenantRole};

    fn auth_user(system_role: SystemRole, restaurant_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "owner@example.test".into(),
            system_role,
            role: Some(TenantRole::Owner),
            restaurant_id,
            restaurant_slug: restaurant_id.map(|_| "la-esquina".into()),
        }
    }

    #[test]
    fn tenant_id_requires_an_active_tenant() {
        let tenant = Uuid::new_v4();
        assert_eq!(
            auth_user(SystemRole::User, Some(tenant)).tenant_id().unwrap(),
            tenant
        );
        assert!(auth_user(SystemRole::SuperAdmin, None).tenant_id().is_err());
    }

    #[test]
    fn ensure_super_admin_rejects_tenant_users() {
        assert!(ensure_super_admin(&auth_user(SystemRole::SuperAdmin, None)).is_ok());
        assert!(ensure_super_admin(&auth_user(SystemRole::User, Some(Uuid::new_v4()))).is_err());
    }
}
