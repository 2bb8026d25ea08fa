use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, SeatNumbers};
use crate::entities::bus::{self, Seat};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BookSeatsRequest {
    pub user_id: Uuid,
    pub bus_id: Uuid,
    pub seats: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BookSeatsResponse {
    pub message: String,
    pub booking: booking::Model,
}

/// Book a set of seats on a bus. All requested seats must be free; otherwise
/// the whole request is rejected and nothing is written.
pub async fn book_seats(
    State(state): State<AppState>,
    Json(payload): Json<BookSeatsRequest>,
) -> AppResult<Json<BookSeatsResponse>> {
    let bus = bus::Entity::find_by_id(payload.bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    // The booking row references the user, so it must still exist.
    let user = user::Entity::find_by_id(payload.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let unavailable: Vec<String> = bus
        .seats
        .0
        .iter()
        .filter(|s| payload.seats.contains(&s.seat_number) && s.is_booked)
        .map(|s| s.seat_number.clone())
        .collect();

    if !unavailable.is_empty() {
        return Err(AppError::SeatsUnavailable(unavailable));
    }

    // The availability check above and the save below are not isolated:
    // two concurrent requests for the same seat can both pass the check.
    let mut seats = bus.seats.clone();
    for seat in seats.0.iter_mut() {
        if payload.seats.contains(&seat.seat_number) {
            seat.is_booked = true;
        }
    }

    let price = bus.price;
    let mut active = bus.into_active_model();
    active.seats = Set(seats);
    active.update(&state.db).await?;

    let total_amount = price * payload.seats.len() as f64;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        bus_id: Set(payload.bus_id),
        seats_booked: Set(SeatNumbers(payload.seats)),
        total_amount: Set(total_amount),
        created_at: Set(Utc::now().into()),
    };

    let booking = new_booking.insert(&state.db).await?;

    Ok(Json(BookSeatsResponse {
        message: "Seats booked successfully".to_string(),
        booking,
    }))
}

/// List the seats of a bus that are still free
pub async fn available_seats(
    State(state): State<AppState>,
    Path(bus_id): Path<Uuid>,
) -> AppResult<Json<Vec<Seat>>> {
    let bus = bus::Entity::find_by_id(bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    let available: Vec<Seat> = bus.seats.0.into_iter().filter(|s| !s.is_booked).collect();

    Ok(Json(available))
}
