use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    dto::auth::{AuthenticatedUser, LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    middleware::auth::Claims,
    models::{Restaurant, SystemRole, TenantMembership, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOKEN_LIFETIME_HOURS: i64 = 24;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<()> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    // Unknown email and bad password take the same path so the response
    // does not reveal whether the account exists.
    let user = user.ok_or(AppError::InvalidCredentials)?;
    verify_password(&password, &user.password_hash)?;

    let membership = first_membership(state, &user).await?;
    if membership.is_none() && user.system_role != SystemRole::SuperAdmin {
        return Err(AppError::NoTenantsAssigned);
    }

    let restaurant = match membership.as_ref() {
        Some(m) => {
            let restaurant: Restaurant =
                sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
                    .bind(m.restaurant_id)
                    .fetch_one(&state.pool)
                    .await?;
            Some(restaurant)
        }
        None => None,
    };

    let token = issue_token(state, &user, membership.as_ref(), restaurant.as_ref())?;

    tracing::info!(user_id = %user.id, "user logged in");

    let resp = LoginResponse {
        token,
        user: AuthenticatedUser {
            id: user.id,
            email: user.email,
            system_role: user.system_role,
            role: membership.map(|m| m.role),
        },
        restaurant,
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// A user may belong to several restaurants; the earliest binding becomes
/// the session's active tenant (deterministic by creation time).
async fn first_membership(state: &AppState, user: &User) -> AppResult<Option<TenantMembership>> {
    let membership: Option<TenantMembership> = sqlx::query_as(
        "SELECT * FROM user_tenants WHERE user_id = $1 ORDER BY created_at ASC, id ASC LIMIT 1",
    )
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?;
    Ok(membership)
}

fn issue_token(
    state: &AppState,
    user: &User,
    membership: Option<&TenantMembership>,
    restaurant: Option<&Restaurant>,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: membership.map(|m| m.role),
        system_role: user.system_role,
        restaurant_id: membership.map(|m| m.restaurant_id),
        restaurant_slug: restaurant.map(|r| r.slug.clone()),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter3!", &hash).is_err());
    }
}
