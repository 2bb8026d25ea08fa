use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::handlers::profile::{self, ProfileResponse};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<user::Model>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_users: u64,
}

/// List all users, newest first, paginated (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<UserListResponse>> {
    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination.limit.unwrap_or(10).max(1);

    let paginator = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .paginate(&state.db, limit);

    let total_users = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    let users = paginator.fetch_page(page - 1).await?;

    Ok(Json(UserListResponse {
        users,
        current_page: page,
        total_pages,
        total_users,
    }))
}

/// Get one user by id (admin)
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<user::Model>> {
    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update any user (admin). Unlike the self-service path this may also set
/// role and the verified flag; email and password stay immutable.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let form = FormData::collect(multipart, &state.config.upload_dir, &["profilePicture"]).await?;

    let result = apply_admin_update(&state, id, &form).await;
    form.cleanup().await;

    result.map(|user| {
        Json(ProfileResponse {
            message: "User updated successfully".to_string(),
            user,
        })
    })
}

async fn apply_admin_update(
    state: &AppState,
    id: Uuid,
    form: &FormData,
) -> AppResult<user::Model> {
    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut active = user.clone().into_active_model();

    if let Some(name) = form.text("name") {
        active.name = Set(Some(name.to_string()));
    }
    if let Some(full_name) = form.text("fullName") {
        active.full_name = Set(Some(full_name.to_string()));
    }
    if let Some(phone) = form.text("phone") {
        active.phone = Set(Some(phone.to_string()));
    }
    if let Some(role) = form.text("role") {
        active.role = Set(match role {
            "admin" => UserRole::Admin,
            "user" => UserRole::User,
            _ => return Err(AppError::BadRequest("Invalid role".to_string())),
        });
    }
    if let Some(verified) = form.text("isVerified") {
        active.is_verified = Set(verified
            .parse()
            .map_err(|_| AppError::BadRequest("isVerified must be true or false".to_string()))?);
    }

    if profile::ADDRESS_FIELDS.iter().any(|f| form.text(f).is_some()) {
        active.address = Set(Some(profile::merged_address(form, user.address.as_ref())));
    }

    if let Some(path) = form.file("profilePicture") {
        let uploaded = state.media.upload(path, "profile_images").await?;
        if let Some(old) = &user.profile_image {
            state.media.delete(&old.public_id).await?;
        }
        active.profile_image = Set(Some(uploaded));
    }

    Ok(active.update(&state.db).await?)
}
