use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tower::ServiceExt;
use uuid::Uuid;

use bus_booking_backend::entities::user::{self, Gender, ImageRef, UserRole};
use bus_booking_backend::entities::{booking, bus};
use bus_booking_backend::error::AppResult;
use bus_booking_backend::handlers::auth::hash_password;
use bus_booking_backend::services::mail::Mailer;
use bus_booking_backend::services::media::MediaStore;
use bus_booking_backend::utils::jwt::verify_token;
use bus_booking_backend::{routes, AppState, Config};

const JWT_SECRET: &str = "test-secret";
const BOUNDARY: &str = "test-boundary";

struct TestMediaStore;

#[async_trait::async_trait]
impl MediaStore for TestMediaStore {
    async fn upload(&self, file_path: &Path, folder: &str) -> AppResult<ImageRef> {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(ImageRef {
            secure_url: format!("https://media.test/{}/{}", folder, file_name),
            public_id: format!("{}/{}", folder, Uuid::new_v4()),
        })
    }

    async fn delete(&self, _public_id: &str) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMailer {
    messages: Mutex<Vec<(String, String, String)>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> AppResult<()> {
        self.messages
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html_body));
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration_hours: 24,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        frontend_url: "http://localhost:5173".to_string(),
        support_email: "support@test.local".to_string(),
        smtp_server: "smtp.test.local".to_string(),
        smtp_port: 587,
        email_user: "noreply@test.local".to_string(),
        email_pass: String::new(),
        media_api_url: "https://media.test".to_string(),
        media_cloud_name: "test".to_string(),
        media_api_key: String::new(),
        upload_dir: std::env::temp_dir()
            .join("bus-booking-tests")
            .to_string_lossy()
            .into_owned(),
    }
}

async fn spawn_app() -> (Router, DatabaseConnection, Arc<RecordingMailer>) {
    // A single pooled connection keeps every query on the same in-memory db.
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to test database");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        db: db.clone(),
        config: test_config(),
        media: Arc::new(TestMediaStore),
        mailer: mailer.clone(),
    };

    (routes::create_router(state), db, mailer)
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

async fn request_with_token(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename, content) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn send_multipart(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(multipart_body(fields, files))).unwrap())
        .await
        .unwrap();
    read_json(response).await
}

async fn register(app: &Router, email: &str, password: &str, name: &str) -> (String, Value) {
    let (status, body) = post_json(
        app,
        "/api/users/create-account",
        json!({ "email": email, "password": password, "name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (body["token"].as_str().unwrap().to_string(), body["user"].clone())
}

async fn create_bus(app: &Router, price: &str) -> Value {
    let (status, body) = send_multipart(
        app,
        "POST",
        "/api/buses/add",
        None,
        &[
            ("busNumber", "KA-01-1234"),
            ("operator", "Sunrise Travels"),
            ("from", "Bengaluru"),
            ("to", "Chennai"),
            ("departureTime", "2026-09-01T22:30:00+05:30"),
            ("arrivalTime", "2026-09-02T05:30:00+05:30"),
            ("price", price),
            ("isAC", "true"),
        ],
        &[("image", "bus.jpg", b"fake-image-bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create bus failed: {}", body);
    body["bus"].clone()
}

async fn seed_admin(app: &Router, db: &DatabaseConnection) -> String {
    let admin = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set("admin@busbooking.com".to_string()),
        password_hash: Set(hash_password("admin123").unwrap()),
        name: Set(Some("Admin".to_string())),
        gender: Set(Gender::Other),
        is_verified: Set(true),
        role: Set(UserRole::Admin),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    admin.insert(db).await.unwrap();

    let (status, body) = post_json(
        app,
        "/api/users/login",
        json!({ "email": "admin@busbooking.com", "password": "admin123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn sha256_hex(input: &str) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[tokio::test]
async fn test_register_login_round_trip() {
    let (app, _db, _mailer) = spawn_app().await;

    let (token, user) = register(&app, "rider@example.com", "secret1", "Rider").await;
    assert_eq!(user["email"], "rider@example.com");
    assert_eq!(user["is_verified"], false);
    assert_eq!(user["role"], "user");
    assert!(user.get("password_hash").is_none());

    let claims = verify_token(&token, JWT_SECRET).unwrap();
    assert_eq!(claims.role, UserRole::User);
    assert_eq!(claims.email, "rider@example.com");

    let (status, body) = post_json(
        &app,
        "/api/users/login",
        json!({ "email": "rider@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["is_verified"], false);

    let claims = verify_token(body["token"].as_str().unwrap(), JWT_SECRET).unwrap();
    assert_eq!(claims.role, UserRole::User);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let (app, db, _mailer) = spawn_app().await;

    register(&app, "rider@example.com", "secret1", "Rider").await;

    // Case-insensitive: same address, different casing
    let (status, body) = post_json(
        &app,
        "/api/users/create-account",
        json!({ "email": "RIDER@Example.COM", "password": "secret2", "name": "Other" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists with this email");

    let users = user::Entity::find().all(&db).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_register_short_password_rejected() {
    let (app, _db, _mailer) = spawn_app().await;

    let (status, _body) = post_json(
        &app,
        "/api/users/create-account",
        json!({ "email": "rider@example.com", "password": "short", "name": "Rider" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let (app, _db, _mailer) = spawn_app().await;

    register(&app, "rider@example.com", "secret1", "Rider").await;

    let (status, _body) = post_json(
        &app,
        "/api/users/login",
        json!({ "email": "rider@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let (app, _db, _mailer) = spawn_app().await;

    let (status, _body) = request_with_token(&app, "GET", "/api/users/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _body) =
        request_with_token(&app, "GET", "/api/users/profile", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bus_create_and_fetch() {
    let (app, _db, _mailer) = spawn_app().await;

    let bus = create_bus(&app, "499.5").await;
    let bus_id = bus["id"].as_str().unwrap();
    assert_eq!(bus["bus_number"], "KA-01-1234");
    assert!(bus["image"].as_str().unwrap().starts_with("https://media.test/bus_images/"));

    let (status, body) = request_with_token(&app, "GET", "/api/buses", None).await;
    assert_eq!(status, StatusCode::OK);
    let listing = body.as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["from"], "Bengaluru");
    assert_eq!(listing[0]["to"], "Chennai");
    assert!(listing[0].get("seats").is_none());

    let (status, body) =
        request_with_token(&app, "GET", &format!("/api/buses/{}", bus_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seats"].as_array().unwrap().len(), 40);
    assert_eq!(body["seats"][0]["seat_number"], "1A");

    let (status, _body) = request_with_token(
        &app,
        "GET",
        &format!("/api/buses/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_bus_image_rejected() {
    let (app, _db, _mailer) = spawn_app().await;

    let (status, body) = send_multipart(
        &app,
        "POST",
        "/api/buses/add",
        None,
        &[
            ("busNumber", "KA-01-1234"),
            ("operator", "Sunrise Travels"),
            ("from", "Bengaluru"),
            ("to", "Chennai"),
            ("departureTime", "2026-09-01T22:30:00+05:30"),
            ("arrivalTime", "2026-09-02T05:30:00+05:30"),
            ("price", "100"),
            ("isAC", "false"),
        ],
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Bus image is required.");
}

#[tokio::test]
async fn test_booking_flow() {
    let (app, db, _mailer) = spawn_app().await;

    let bus = create_bus(&app, "100").await;
    let bus_id = bus["id"].as_str().unwrap().to_string();
    let (_token, user) = register(&app, "rider@example.com", "secret1", "Rider").await;
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, body) = request_with_token(
        &app,
        "GET",
        &format!("/api/bookings/available-seats/{}", bus_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 40);

    let (status, body) = post_json(
        &app,
        "/api/bookings/book",
        json!({ "user_id": user_id, "bus_id": bus_id, "seats": ["1A", "1B"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["total_amount"].as_f64().unwrap(), 200.0);
    assert_eq!(body["booking"]["seats_booked"], json!(["1A", "1B"]));

    let (status, body) = request_with_token(
        &app,
        "GET",
        &format!("/api/bookings/available-seats/{}", bus_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 38);

    // Rebooking a taken seat fails and names it
    let (status, body) = post_json(
        &app,
        "/api/bookings/book",
        json!({ "user_id": user_id, "bus_id": bus_id, "seats": ["1A"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Some seats are already booked.");
    assert_eq!(body["seats"], json!(["1A"]));

    // A partial conflict books nothing: the free seat stays free
    let (status, body) = post_json(
        &app,
        "/api/bookings/book",
        json!({ "user_id": user_id, "bus_id": bus_id, "seats": ["1A", "3A"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["seats"], json!(["1A"]));

    let (_status, body) = request_with_token(
        &app,
        "GET",
        &format!("/api/bookings/available-seats/{}", bus_id),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 38);

    // Only the successful booking left a record
    let bookings = booking::Entity::find().all(&db).await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].total_amount, 200.0);
}

#[tokio::test]
async fn test_booking_unknown_bus_or_user() {
    let (app, _db, _mailer) = spawn_app().await;

    let bus = create_bus(&app, "100").await;
    let bus_id = bus["id"].as_str().unwrap().to_string();
    let (_token, user) = register(&app, "rider@example.com", "secret1", "Rider").await;
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, _body) = post_json(
        &app,
        "/api/bookings/book",
        json!({ "user_id": user_id, "bus_id": Uuid::new_v4(), "seats": ["1A"] }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _body) = post_json(
        &app,
        "/api/bookings/book",
        json!({ "user_id": Uuid::new_v4(), "bus_id": bus_id, "seats": ["1A"] }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_profile_flow() {
    let (app, _db, _mailer) = spawn_app().await;

    let (token, user) = register(&app, "rider@example.com", "secret1", "Rider").await;
    assert_eq!(user["is_verified"], false);

    // Missing phone
    let (status, body) = send_multipart(
        &app,
        "PUT",
        "/api/users/verify-profile",
        Some(&token),
        &[
            ("fullName", "Rider Kumar"),
            ("gender", "Male"),
            ("dateOfBirth", "1994-05-20"),
            ("idType", "Aadhar Card"),
            ("idNumber", "1234-5678-9012"),
        ],
        &[("idDocument", "aadhar.jpg", b"doc-bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields for verification");

    let (status, body) = send_multipart(
        &app,
        "PUT",
        "/api/users/verify-profile",
        Some(&token),
        &[
            ("fullName", "Rider Kumar"),
            ("phone", "9876543210"),
            ("gender", "Male"),
            ("dateOfBirth", "1994-05-20"),
            ("idType", "Aadhar Card"),
            ("idNumber", "1234-5678-9012"),
            ("city", "Bengaluru"),
        ],
        &[("idDocument", "aadhar.jpg", b"doc-bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {}", body);
    assert_eq!(body["user"]["is_verified"], true);
    assert_eq!(body["user"]["valid_id"]["type"], "Aadhar Card");
    assert_eq!(body["user"]["address"]["city"], "Bengaluru");
    assert_eq!(body["user"]["address"]["country"], "India");

    let (status, body) =
        request_with_token(&app, "GET", "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_verified"], true);
    assert_eq!(body["full_name"], "Rider Kumar");
}

#[tokio::test]
async fn test_verify_profile_without_document_stays_unverified() {
    let (app, _db, _mailer) = spawn_app().await;

    let (token, _user) = register(&app, "rider@example.com", "secret1", "Rider").await;

    let (status, body) = send_multipart(
        &app,
        "PUT",
        "/api/users/verify-profile",
        Some(&token),
        &[
            ("fullName", "Rider Kumar"),
            ("phone", "9876543210"),
            ("gender", "Male"),
            ("dateOfBirth", "1994-05-20"),
            ("idType", "PAN Card"),
            ("idNumber", "ABCDE1234F"),
        ],
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_verified"], false);
}

#[tokio::test]
async fn test_update_profile_ignores_privileged_fields() {
    let (app, _db, _mailer) = spawn_app().await;

    let (token, _user) = register(&app, "rider@example.com", "secret1", "Rider").await;

    let (status, body) = send_multipart(
        &app,
        "PUT",
        "/api/users/update-profile",
        Some(&token),
        &[
            ("name", "Renamed Rider"),
            ("role", "admin"),
            ("email", "other@example.com"),
            ("isVerified", "true"),
        ],
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Renamed Rider");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["email"], "rider@example.com");
    assert_eq!(body["user"]["is_verified"], false);
}

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let (app, _db, mailer) = spawn_app().await;

    register(&app, "rider@example.com", "secret1", "Rider").await;

    // Unknown email: same generic answer, nothing sent
    let (status, body) = post_json(
        &app,
        "/api/users/forgot-password",
        json!({ "email": "nobody@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("If an account exists"));
    assert!(mailer.messages.lock().unwrap().is_empty());

    let (status, _body) = post_json(
        &app,
        "/api/users/forgot-password",
        json!({ "email": "rider@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let email_body = {
        let messages = mailer.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "rider@example.com");
        messages[0].2.clone()
    };

    // The raw token is only in the emailed link
    let marker = "/reset-password/";
    let start = email_body.find(marker).unwrap() + marker.len();
    let token: String = email_body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    assert_eq!(token.len(), 64);

    let (status, _body) = post_json(
        &app,
        &format!("/api/users/reset-password/{}", token),
        json!({ "password": "tiny" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _body) = post_json(
        &app,
        &format!("/api/users/reset-password/{}", token),
        json!({ "password": "new-secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = post_json(
        &app,
        "/api/users/login",
        json!({ "email": "rider@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _body) = post_json(
        &app,
        "/api/users/login",
        json!({ "email": "rider@example.com", "password": "new-secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_with_expired_token_rejected() {
    let (app, db, _mailer) = spawn_app().await;

    register(&app, "rider@example.com", "secret1", "Rider").await;

    let stored = user::Entity::find()
        .filter(user::Column::Email.eq("rider@example.com"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    let mut active = stored.into_active_model();
    active.password_reset_token = Set(Some(sha256_hex("expired-token")));
    active.password_reset_expires = Set(Some((Utc::now() - Duration::minutes(5)).into()));
    active.update(&db).await.unwrap();

    let (status, body) = post_json(
        &app,
        "/api/users/reset-password/expired-token",
        json!({ "password": "new-secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Token is invalid or has expired");

    // Password unchanged
    let (status, _body) = post_json(
        &app,
        "/api/users/login",
        json!({ "email": "rider@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_user_list_pagination() {
    let (app, db, _mailer) = spawn_app().await;

    let admin_token = seed_admin(&app, &db).await;
    for i in 1..=3 {
        register(&app, &format!("rider{}@example.com", i), "secret1", "Rider").await;
    }

    let (status, body) = request_with_token(
        &app,
        "GET",
        "/api/users/admin/users?page=1&limit=2",
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_users"], 4);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["current_page"], 1);

    let (status, body) = request_with_token(
        &app,
        "GET",
        "/api/users/admin/users?page=2&limit=2",
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    // Non-admin tokens are rejected
    let (user_token, _user) =
        register(&app, "plain@example.com", "secret1", "Plain").await;
    let (status, _body) = request_with_token(
        &app,
        "GET",
        "/api/users/admin/users",
        Some(&user_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _body) =
        request_with_token(&app, "GET", "/api/users/admin/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_get_and_update_user() {
    let (app, db, _mailer) = spawn_app().await;

    let admin_token = seed_admin(&app, &db).await;
    let (_token, user) = register(&app, "rider@example.com", "secret1", "Rider").await;
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, body) = request_with_token(
        &app,
        "GET",
        &format!("/api/users/admin/user/{}", user_id),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "rider@example.com");

    let (status, body) = send_multipart(
        &app,
        "PUT",
        &format!("/api/users/admin/user/{}", user_id),
        Some(&admin_token),
        &[("role", "admin"), ("isVerified", "true")],
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["is_verified"], true);

    let (status, _body) = request_with_token(
        &app,
        "GET",
        &format!("/api/users/admin/user/{}", Uuid::new_v4()),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_relay() {
    let (app, _db, mailer) = spawn_app().await;

    let (status, _body) = post_json(
        &app,
        "/api/send-contact",
        json!({
            "name": "Asha",
            "email": "asha@example.com",
            "subject": "Refund",
            "message": "Please call me back about my refund."
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    {
        let messages = mailer.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "support@test.local");
        assert_eq!(messages[0].1, "New Contact Form: Refund");
    }

    // Phone + known carrier adds an SMS through the email gateway
    let (status, _body) = post_json(
        &app,
        "/api/send-contact",
        json!({
            "name": "Asha",
            "email": "asha@example.com",
            "subject": "Refund",
            "message": "Please call me back.",
            "phone_number": "(987) 654-3210",
            "carrier": "verizon"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    {
        let messages = mailer.messages.lock().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].0, "9876543210@vtext.com");
    }

    let (status, _body) = post_json(
        &app,
        "/api/send-contact",
        json!({ "name": "Asha", "email": "asha@example.com", "subject": "", "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_image_lookup() {
    let (app, _db, _mailer) = spawn_app().await;

    register(&app, "rider@example.com", "secret1", "Rider").await;

    let (status, body) = request_with_token(
        &app,
        "GET",
        "/api/users/users/profile-image/rider@example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["profile_image"].is_null());

    let (status, _body) = request_with_token(
        &app,
        "GET",
        "/api/users/users/profile-image/nobody@example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_profile() {
    let (app, db, _mailer) = spawn_app().await;

    let (token, _user) = register(&app, "rider@example.com", "secret1", "Rider").await;

    let (status, _body) =
        request_with_token(&app, "DELETE", "/api/users/delete-profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    assert!(user::Entity::find().all(&db).await.unwrap().is_empty());

    // The token outlives the account but no longer authenticates
    let (status, _body) =
        request_with_token(&app, "GET", "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _body) = post_json(
        &app,
        "/api/users/login",
        json!({ "email": "rider@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_seat_grid_on_new_bus() {
    let (app, db, _mailer) = spawn_app().await;

    let created = create_bus(&app, "250").await;
    let bus_id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

    let stored = bus::Entity::find_by_id(bus_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.seats.0.len(), 40);
    assert!(stored.seats.0.iter().all(|s| !s.is_booked));
    assert_eq!(stored.seats.0[0].seat_number, "1A");
    assert_eq!(stored.seats.0[39].seat_number, "10D");
}
