//! HTTP handlers for students. Everything except the listing requires a
//! bearer token; the occupancy bookkeeping happens inside ParkingService.

use crate::{
    errors::AppError,
    models::{
        spot::Spot,
        student::{Student, StudentBody},
    },
    services::{auth_service::AuthUser, parking_service::ParkingService},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

/// GET `/student` — every student. Anonymous access allowed.
pub async fn list_students(
    State(parking): State<ParkingService>,
) -> Result<Json<Vec<Student>>, AppError> {
    Ok(Json(parking.list_students().await?))
}

/// POST `/student` — create a student without provisioning credentials.
pub async fn create_student(
    _user: AuthUser,
    State(parking): State<ParkingService>,
    Json(body): Json<StudentBody>,
) -> Result<impl IntoResponse, AppError> {
    body.validate().map_err(AppError::validation)?;

    let student = parking.create_student(&body).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/student/{}", student.id))],
        Json(student),
    ))
}

/// GET `/student/{id}`.
pub async fn get_student(
    _user: AuthUser,
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(parking.get_student(id).await?))
}

/// GET `/student/{id}/spot` — the spot this student holds.
pub async fn get_student_spot(
    _user: AuthUser,
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
) -> Result<Json<Spot>, AppError> {
    Ok(Json(parking.student_spot(id).await?))
}

/// PUT `/student/{id}` — replace a student's fields.
///
/// The route id must have a provisioned account and must be the caller's
/// own; a changed `spotId` flows through the occupancy bookkeeping.
pub async fn update_student(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StudentBody>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.find_account(id).await?;

    if user.account_id != id {
        return Err(AppError::bad_request(
            "The user id does not match the student id",
        ));
    }

    body.validate().map_err(AppError::validation)?;
    state.parking.update_student(id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE `/student/{id}` — remove a student, releasing their spot.
pub async fn delete_student(
    _user: AuthUser,
    State(parking): State<ParkingService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    parking.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
