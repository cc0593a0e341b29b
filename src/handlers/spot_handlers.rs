//! HTTP handlers for parking spot administration.

use crate::{
    errors::AppError,
    models::spot::{Spot, SpotBody},
    services::parking_service::ParkingService,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

/// GET `/spot` — every spot.
pub async fn list_spots(
    State(parking): State<ParkingService>,
) -> Result<Json<Vec<Spot>>, AppError> {
    Ok(Json(parking.list_spots().await?))
}

/// GET `/spot/{id}`.
pub async fn get_spot(
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
) -> Result<Json<Spot>, AppError> {
    Ok(Json(parking.get_spot(id).await?))
}

/// GET `/spotregion/{region}` — spots in a region, 404 when none match.
pub async fn list_spots_by_region(
    State(parking): State<ParkingService>,
    Path(region): Path<String>,
) -> Result<Json<Vec<Spot>>, AppError> {
    let spots = parking.spots_in_region(&region).await?;
    if spots.is_empty() {
        return Err(AppError::not_found(format!(
            "no spots found in region `{}`",
            region
        )));
    }
    Ok(Json(spots))
}

/// POST `/spot` — create a spot, answering 201 with a Location header.
pub async fn create_spot(
    State(parking): State<ParkingService>,
    Json(body): Json<SpotBody>,
) -> Result<impl IntoResponse, AppError> {
    body.validate().map_err(AppError::validation)?;

    let spot = parking.create_spot(&body).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/spot/{}", spot.id))],
        Json(spot),
    ))
}

/// PUT `/spot/{id}` — replace a spot's user-editable fields.
pub async fn update_spot(
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
    Json(body): Json<SpotBody>,
) -> Result<impl IntoResponse, AppError> {
    body.validate().map_err(AppError::validation)?;
    parking.update_spot(id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE `/spot/{id}`.
pub async fn delete_spot(
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    parking.delete_spot(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
