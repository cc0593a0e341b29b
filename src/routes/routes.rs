//! Defines routes for all parking-spot management operations.
//!
//! ## Structure
//! - **Admin endpoints** (no auth)
//!   - `GET/POST   /region`, `PUT/DELETE /region/{id}`
//!   - `GET/POST   /spot`, `GET/PUT/DELETE /spot/{id}`
//!   - `GET        /spotregion/{region}` — spots filtered by region name
//!
//! - **Student endpoints** (bearer token, except the listing)
//!   - `GET  /student` — anonymous allowed
//!   - `POST /student`, `GET/PUT/DELETE /student/{id}`
//!   - `GET  /student/{id}/spot` — the spot a student holds
//!
//! - **Identity endpoints** (anonymous)
//!   - `POST /user/register`, `POST /user/login` — token envelopes
//!
//! Protected handlers take an `AuthUser` extractor, which rejects missing
//! or invalid tokens with 401 before any business logic runs.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        region_handlers::{create_region, delete_region, list_regions, update_region},
        spot_handlers::{
            create_spot, delete_spot, get_spot, list_spots, list_spots_by_region, update_spot,
        },
        student_handlers::{
            create_student, delete_student, get_student, get_student_spot, list_students,
            update_student,
        },
        user_handlers::{login, register},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build and return the router for the whole API surface.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Region administration
        .route("/region", get(list_regions).post(create_region))
        .route("/region/{id}", put(update_region).delete(delete_region))
        // Spot administration
        .route("/spot", get(list_spots).post(create_spot))
        .route(
            "/spot/{id}",
            get(get_spot).put(update_spot).delete(delete_spot),
        )
        .route("/spotregion/{region}", get(list_spots_by_region))
        // Students
        .route("/student", get(list_students).post(create_student))
        .route(
            "/student/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/student/{id}/spot", get(get_student_spot))
        // Identity
        .route("/user/register", post(register))
        .route("/user/login", post(login))
}
