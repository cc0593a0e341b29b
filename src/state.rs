//! Shared application state handed to the router.

use crate::services::{auth_service::AuthService, parking_service::ParkingService};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub parking: ParkingService,
    pub auth: AuthService,
}

impl FromRef<AppState> for ParkingService {
    fn from_ref(state: &AppState) -> Self {
        state.parking.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
