//! Registration, login, token refresh, and account management.

use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;
use tracing::info;

use verbatim_core::{RegisterRequest, TokenPair, UserResponse};

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;

/// OAuth2 password-grant form fields (client compatibility).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshForm {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeEmail {
    pub email: Option<String>,
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    if state
        .db
        .users
        .get_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest(
            "Username already registered".to_string(),
        ));
    }

    if let Some(email) = req.email.as_deref() {
        if state.db.users.get_by_email(email).await?.is_some() {
            return Err(ApiError::BadRequest("Email already registered".to_string()));
        }
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .db
        .users
        .create(&req.username, req.email.as_deref(), &password_hash)
        .await?;

    info!(
        subsystem = "api",
        component = "account",
        op = "register",
        username = %user.username,
        "User registered"
    );

    Ok(Json(serde_json::json!({
        "message": "User created successfully",
        "username": user.username,
    })))
}

/// POST /token
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state.db.users.get_by_username(&form.username).await?;

    let user = match user {
        Some(user) if verify_password(&form.password, &user.password_hash) => user,
        _ => {
            return Err(ApiError::Unauthorized(
                "Incorrect username or password".to_string(),
            ))
        }
    };

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let pair = state.db.tokens.issue_pair(user.id).await?;
    Ok(Json(pair))
}

/// POST /refresh
pub async fn refresh(
    State(state): State<AppState>,
    Form(form): Form<RefreshForm>,
) -> Result<Json<TokenPair>, ApiError> {
    match state.db.tokens.rotate_refresh(&form.refresh_token).await? {
        Some(pair) => Ok(Json(pair)),
        None => Err(ApiError::Unauthorized("Invalid refresh token".to_string())),
    }
}

/// GET /me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// PUT /me/password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangePassword>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }
    if req.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "New password must not be empty".to_string(),
        ));
    }

    let password_hash = hash_password(&req.new_password)?;
    state.db.users.update_password(user.id, &password_hash).await?;

    // Existing sessions are invalidated; clients must log in again.
    state.db.tokens.revoke_for_user(user.id).await?;

    Ok(Json(serde_json::json!({"status": "success"})))
}

/// PUT /me/email
pub async fn change_email(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangeEmail>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(email) = req.email.as_deref() {
        if let Some(existing) = state.db.users.get_by_email(email).await? {
            if existing.id != user.id {
                return Err(ApiError::BadRequest("Email already registered".to_string()));
            }
        }
    }

    state.db.users.update_email(user.id, req.email.as_deref()).await?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "email": req.email,
    })))
}

/// DELETE /me
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.users.delete(user.id).await?;

    info!(
        subsystem = "api",
        component = "account",
        op = "delete",
        username = %user.username,
        "Account deleted"
    );

    Ok(Json(serde_json::json!({"message": "Account deleted"})))
}
