use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{admin, auth, booking, bus, contact, profile};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public user routes
    let user_public = Router::new()
        .route("/create-account", post(auth::create_account))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password/{token}", post(auth::reset_password))
        .route(
            "/users/profile-image/{email}",
            get(profile::get_profile_image_by_email),
        );

    // Routes requiring a valid token
    let user_protected = Router::new()
        .route("/verify-profile", put(profile::verify_profile))
        .route("/profile", get(profile::get_profile))
        .route("/update-profile", put(profile::update_profile))
        .route("/delete-profile", delete(profile::delete_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin routes (requires auth + admin role)
    let user_admin = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/user/{id}",
            get(admin::get_user).put(admin::update_user),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let bus_routes = Router::new()
        .route("/add", post(bus::create_bus))
        .route("/", get(bus::get_all_buses))
        .route("/{id}", get(bus::get_bus_by_id));

    let booking_routes = Router::new()
        .route("/book", post(booking::book_seats))
        .route("/available-seats/{bus_id}", get(booking::available_seats));

    // Combine all routes
    Router::new()
        .nest(
            "/api/users",
            user_public.merge(user_protected).merge(user_admin),
        )
        .nest("/api/buses", bus_routes)
        .nest("/api/bookings", booking_routes)
        .route("/api/send-contact", post(contact::send_contact))
        .with_state(state)
}
