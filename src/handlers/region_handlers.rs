//! HTTP handlers for region administration. Regions have no auth
//! requirement; they are managed from the campus admin tooling directly.

use crate::{
    errors::AppError,
    models::region::{Region, RegionBody},
    services::parking_service::ParkingService,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

/// GET `/region` — every region.
pub async fn list_regions(
    State(parking): State<ParkingService>,
) -> Result<Json<Vec<Region>>, AppError> {
    Ok(Json(parking.list_regions().await?))
}

/// POST `/region` — create a region, answering 201 with a Location header.
pub async fn create_region(
    State(parking): State<ParkingService>,
    Json(body): Json<RegionBody>,
) -> Result<impl IntoResponse, AppError> {
    body.validate().map_err(AppError::validation)?;

    let region = parking.create_region(&body).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/region/{}", region.id))],
        Json(region),
    ))
}

/// PUT `/region/{id}` — replace a region's fields.
pub async fn update_region(
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
    Json(body): Json<RegionBody>,
) -> Result<impl IntoResponse, AppError> {
    body.validate().map_err(AppError::validation)?;
    parking.update_region(id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE `/region/{id}`.
pub async fn delete_region(
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    parking.delete_region(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
