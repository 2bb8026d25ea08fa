use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::user::{self, Gender, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::AppState;

/// Reset links stay valid for this long after `forgot_password`.
const RESET_TOKEN_VALIDITY_MINUTES: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub message: String,
    pub token: String,
    pub user: user::Model,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUserInfo,
}

/// Slim user view returned by login.
#[derive(Debug, Serialize)]
pub struct LoginUserInfo {
    pub name: Option<String>,
    pub email: String,
    pub is_verified: bool,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn sha256_hex(input: &str) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Register a new account with the minimal fields
pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> AppResult<Json<CreateAccountResponse>> {
    let email = payload.email.trim().to_lowercase();

    if payload.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    // Check if email already exists
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "User already exists with this email".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    let user_id = Uuid::new_v4();
    let new_user = user::ActiveModel {
        id: Set(user_id),
        email: Set(email),
        password_hash: Set(password_hash),
        name: Set(Some(payload.name.clone())),
        gender: Set(Gender::Other),
        is_verified: Set(false),
        role: Set(UserRole::User),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await?;

    let token = create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(CreateAccountResponse {
        message: "Account created successfully".to_string(),
        token,
        user,
    }))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = payload.email.trim().to_lowercase();

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let token = create_token(
        user.id,
        &user.email,
        user.role.clone(),
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: LoginUserInfo {
            name: user.name,
            email: user.email,
            is_verified: user.is_verified,
            role: user.role,
        },
    }))
}

/// Issue a password-reset token. The response is identical whether or not
/// the email exists, to avoid account enumeration.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    let generic = "If an account exists with this email, a reset link has been sent";

    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
    else {
        return Ok(Json(serde_json::json!({ "message": generic })));
    };

    // Only the one-way digest is stored; the raw token goes in the email.
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token_bytes);
    let reset_token: String = token_bytes.iter().map(|b| format!("{:02x}", b)).collect();

    let expires = Utc::now() + Duration::minutes(RESET_TOKEN_VALIDITY_MINUTES);

    let user_email = user.email.clone();
    let mut active = user.into_active_model();
    active.password_reset_token = Set(Some(sha256_hex(&reset_token)));
    active.password_reset_expires = Set(Some(expires.into()));
    active.update(&state.db).await?;

    let reset_url = format!("{}/reset-password/{}", state.config.frontend_url, reset_token);
    let html_body = format!(
        "<p>You requested a password reset</p>\
         <p>Click this link to reset your password (valid for {} minutes):</p>\
         <a href=\"{}\">{}</a>",
        RESET_TOKEN_VALIDITY_MINUTES, reset_url, reset_url
    );

    state
        .mailer
        .send(&user_email, "Password Reset Token", html_body)
        .await?;

    Ok(Json(serde_json::json!({ "message": generic })))
}

/// Redeem a reset token and set a new password
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let hashed_token = sha256_hex(&token);

    let user = user::Entity::find()
        .filter(user::Column::PasswordResetToken.eq(&hashed_token))
        .filter(user::Column::PasswordResetExpires.gt(Utc::now()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Token is invalid or has expired".to_string()))?;

    let mut active = user.into_active_model();
    active.password_hash = Set(hash_password(&payload.password)?);
    active.password_reset_token = Set(None);
    active.password_reset_expires = Set(None);
    active.update(&state.db).await?;

    Ok(Json(serde_json::json!({
        "message": "Password has been reset successfully"
    })))
}
