use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::bus::{self, SeatList};
use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::utils::seats::generate_seat_grid;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateBusResponse {
    pub message: String,
    pub bus: bus::Model,
}

/// Flat listing shape with the route promoted to top-level from/to.
#[derive(Debug, Serialize)]
pub struct BusSummary {
    pub id: Uuid,
    pub bus_number: String,
    pub operator: String,
    pub from: String,
    pub to: String,
    pub departure_time: DateTime<FixedOffset>,
    pub arrival_time: DateTime<FixedOffset>,
    pub is_ac: bool,
    pub image: String,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct BusDetail {
    pub id: Uuid,
    pub bus_number: String,
    pub operator: String,
    pub from: String,
    pub to: String,
    pub departure_time: DateTime<FixedOffset>,
    pub arrival_time: DateTime<FixedOffset>,
    pub is_ac: bool,
    pub image: String,
    pub seats: SeatList,
    pub price: f64,
}

fn required<'a>(form: &'a FormData, name: &str) -> AppResult<&'a str> {
    form.text(name)
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
}

fn parse_timestamp(value: &str, name: &str) -> AppResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|_| AppError::BadRequest(format!("{} must be an RFC 3339 timestamp", name)))
}

/// Create a bus with its image and a freshly generated seat grid
pub async fn create_bus(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<CreateBusResponse>> {
    let form = FormData::collect(multipart, &state.config.upload_dir, &["image"]).await?;
    let result = insert_bus(&state, &form).await;
    form.cleanup().await;
    result.map(Json)
}

async fn insert_bus(state: &AppState, form: &FormData) -> AppResult<CreateBusResponse> {
    let bus_number = required(form, "busNumber")?;
    let operator = required(form, "operator")?;
    let from = required(form, "from")?;
    let to = required(form, "to")?;
    let departure_time = parse_timestamp(required(form, "departureTime")?, "departureTime")?;
    let arrival_time = parse_timestamp(required(form, "arrivalTime")?, "arrivalTime")?;
    let price: f64 = required(form, "price")?
        .parse()
        .map_err(|_| AppError::BadRequest("price must be a number".to_string()))?;
    let is_ac: bool = required(form, "isAC")?
        .parse()
        .map_err(|_| AppError::BadRequest("isAC must be true or false".to_string()))?;

    let image_path = form
        .file("image")
        .ok_or_else(|| AppError::BadRequest("Bus image is required.".to_string()))?;

    let uploaded = state.media.upload(image_path, "bus_images").await?;

    let new_bus = bus::ActiveModel {
        id: Set(Uuid::new_v4()),
        bus_number: Set(bus_number.to_string()),
        operator: Set(operator.to_string()),
        from_city: Set(from.to_string()),
        to_city: Set(to.to_string()),
        departure_time: Set(departure_time),
        arrival_time: Set(arrival_time),
        is_ac: Set(is_ac),
        image: Set(uploaded.secure_url),
        seats: Set(generate_seat_grid()),
        price: Set(price),
    };

    let bus = new_bus.insert(&state.db).await?;

    Ok(CreateBusResponse {
        message: "Bus created successfully".to_string(),
        bus,
    })
}

/// List all buses in the flat shape the search page consumes
pub async fn get_all_buses(State(state): State<AppState>) -> AppResult<Json<Vec<BusSummary>>> {
    let buses = bus::Entity::find().all(&state.db).await?;

    let responses: Vec<BusSummary> = buses
        .into_iter()
        .map(|b| BusSummary {
            id: b.id,
            bus_number: b.bus_number,
            operator: b.operator,
            from: b.from_city,
            to: b.to_city,
            departure_time: b.departure_time,
            arrival_time: b.arrival_time,
            is_ac: b.is_ac,
            image: b.image,
            price: b.price,
        })
        .collect();

    Ok(Json(responses))
}

/// Get one bus including its embedded seat list
pub async fn get_bus_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BusDetail>> {
    let bus = bus::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    Ok(Json(BusDetail {
        id: bus.id,
        bus_number: bus.bus_number,
        operator: bus.operator,
        from: bus.from_city,
        to: bus.to_city,
        departure_time: bus.departure_time,
        arrival_time: bus.arrival_time,
        is_ac: bus.is_ac,
        image: bus.image,
        seats: bus.seats,
        price: bus.price,
    }))
}
