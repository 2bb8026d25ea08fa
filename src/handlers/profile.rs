use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use serde::Serialize;

use crate::entities::user::{self, Address, Gender, IdType, ValidId};
use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::AppState;

pub(crate) const ADDRESS_FIELDS: [&str; 5] = ["street", "city", "state", "zip", "country"];

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: user::Model,
}

fn parse_gender(value: &str) -> AppResult<Gender> {
    match value {
        "Male" => Ok(Gender::Male),
        "Female" => Ok(Gender::Female),
        "Other" => Ok(Gender::Other),
        _ => Err(AppError::BadRequest(
            "Gender must be Male, Female or Other".to_string(),
        )),
    }
}

fn parse_id_type(value: &str) -> AppResult<IdType> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| AppError::BadRequest(format!("Unsupported ID type: {}", value)))
}

fn parse_date(value: &str) -> AppResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("dateOfBirth must be YYYY-MM-DD".to_string()))
}

fn validate_phone(value: &str) -> AppResult<()> {
    if value.len() == 10 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Phone number must be 10 digits".to_string(),
        ))
    }
}

/// Merge incoming address fields over the stored ones. Country falls back
/// to "India" when neither side has one.
pub(crate) fn merged_address(form: &FormData, existing: Option<&Address>) -> Address {
    let prev = existing.cloned().unwrap_or_default();
    Address {
        street: form.text("street").map(str::to_string).or(prev.street),
        city: form.text("city").map(str::to_string).or(prev.city),
        state: form.text("state").map(str::to_string).or(prev.state),
        zip: form.text("zip").map(str::to_string).or(prev.zip),
        country: form
            .text("country")
            .map(str::to_string)
            .or(prev.country)
            .or_else(|| Some("India".to_string())),
    }
}

/// Complete identity verification: personal fields, identity document and
/// optional images. The verified flag flips only once a document image
/// reference is present.
pub async fn verify_profile(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let form = FormData::collect(
        multipart,
        &state.config.upload_dir,
        &["profilePicture", "idDocument"],
    )
    .await?;

    let result = apply_verification(&state, &user, &form).await;
    form.cleanup().await;

    result.map(|user| {
        Json(ProfileResponse {
            message: "Profile verified successfully".to_string(),
            user,
        })
    })
}

async fn apply_verification(
    state: &AppState,
    user: &user::Model,
    form: &FormData,
) -> AppResult<user::Model> {
    let (full_name, phone, gender, date_of_birth, id_type, id_number) = match (
        form.text("fullName"),
        form.text("phone"),
        form.text("gender"),
        form.text("dateOfBirth"),
        form.text("idType"),
        form.text("idNumber"),
    ) {
        (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) => (a, b, c, d, e, f),
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields for verification".to_string(),
            ))
        }
    };

    validate_phone(phone)?;
    let gender = parse_gender(gender)?;
    let date_of_birth = parse_date(date_of_birth)?;
    let id_type = parse_id_type(id_type)?;

    let mut profile_image = user.profile_image.clone();
    if let Some(path) = form.file("profilePicture") {
        let uploaded = state.media.upload(path, "profile_images").await?;
        if let Some(old) = &user.profile_image {
            state.media.delete(&old.public_id).await?;
        }
        profile_image = Some(uploaded);
    }

    let mut document_image = user.valid_id.as_ref().and_then(|v| v.document_image.clone());
    if let Some(path) = form.file("idDocument") {
        let uploaded = state.media.upload(path, "id_documents").await?;
        if let Some(old) = &document_image {
            state.media.delete(&old.public_id).await?;
        }
        document_image = Some(uploaded);
    }

    let address = merged_address(form, user.address.as_ref());
    let has_document = document_image.is_some();

    let mut active = user.clone().into_active_model();
    active.full_name = Set(Some(full_name.to_string()));
    active.phone = Set(Some(phone.to_string()));
    active.gender = Set(gender);
    active.date_of_birth = Set(Some(date_of_birth));
    active.address = Set(Some(address));
    active.profile_image = Set(profile_image);
    active.valid_id = Set(Some(ValidId {
        id_type,
        number: id_number.to_string(),
        document_image,
    }));
    if has_document {
        active.is_verified = Set(true);
    }

    Ok(active.update(&state.db).await?)
}

/// Fetch the logged-in user's profile
pub async fn get_profile(Extension(user): Extension<user::Model>) -> Json<user::Model> {
    Json(user)
}

/// Update profile fields and optionally the profile picture. Email, password,
/// role and the verified flag are not updatable through this path.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let form = FormData::collect(multipart, &state.config.upload_dir, &["profilePicture"]).await?;

    let result = apply_profile_update(&state, &user, &form).await;
    form.cleanup().await;

    result.map(|user| {
        Json(ProfileResponse {
            message: "Profile updated successfully".to_string(),
            user,
        })
    })
}

async fn apply_profile_update(
    state: &AppState,
    user: &user::Model,
    form: &FormData,
) -> AppResult<user::Model> {
    let mut active = user.clone().into_active_model();

    if let Some(name) = form.text("name") {
        active.name = Set(Some(name.to_string()));
    }
    if let Some(full_name) = form.text("fullName") {
        active.full_name = Set(Some(full_name.to_string()));
    }
    if let Some(phone) = form.text("phone") {
        validate_phone(phone)?;
        active.phone = Set(Some(phone.to_string()));
    }
    if let Some(gender) = form.text("gender") {
        active.gender = Set(parse_gender(gender)?);
    }
    if let Some(date_of_birth) = form.text("dateOfBirth") {
        active.date_of_birth = Set(Some(parse_date(date_of_birth)?));
    }

    if ADDRESS_FIELDS.iter().any(|f| form.text(f).is_some()) {
        active.address = Set(Some(merged_address(form, user.address.as_ref())));
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

/// Public lookup of a user's profile image by email
pub async fn get_profile_image_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let email = email.trim().to_lowercase();

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(serde_json::json!({
        "profile_image": user.profile_image,
    })))
}

/// Delete the logged-in user's account and its remote images
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(user): Extension<user::Model>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(image) = &user.profile_image {
        state.media.delete(&image.public_id).await?;
    }
    if let Some(document) = user.valid_id.as_ref().and_then(|v| v.document_image.as_ref()) {
        state.media.delete(&document.public_id).await?;
    }

    user::Entity::delete_by_id(user.id).exec(&state.db).await?;

    Ok(Json(serde_json::json!({
        "message": "User profile deleted successfully"
    })))
}
