use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config;
use crate::database::models::User;
use crate::database::users::UserRepository;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register - Create an account and receive a JWT token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let repository = UserRepository::new(state.pool.clone());

    if repository.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let user = repository
        .insert(&payload.name, &payload.email, &hash_password(&payload.password))
        .await?;

    tracing::info!("Registered user {}", user.id);

    let token = issue_token(&user)?;
    Ok((StatusCode::CREATED, Json(session_body(&user, token))))
}

/// POST /api/auth/login - Authenticate and receive a JWT token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let repository = UserRepository::new(state.pool.clone());

    // Same message for unknown email and bad password
    let user = repository
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(&user)?;
    Ok(Json(session_body(&user, token)))
}

/// GET /api/auth/whoami - Echo the authenticated identity
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "id": auth_user.user_id,
        "name": auth_user.name,
        "email": auth_user.email,
    }))
}

fn issue_token(user: &User) -> Result<String, ApiError> {
    let claims = Claims::new(user.id, user.name.clone(), user.email.clone());
    generate_jwt(claims).map_err(|e| ApiError::server_error(e.to_string()))
}

fn session_body(user: &User, token: String) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "token": token,
        "expires_in": config::config().security.jwt_expiry_hours * 3600,
    })
}
