//! Core data models for the campus parking service.
//!
//! These entities represent regions, parking spots, students, and the
//! credential accounts behind them. They map cleanly to database tables via
//! `sqlx::FromRow` and serialize naturally as JSON via `serde`.

pub mod account;
pub mod region;
pub mod spot;
pub mod student;
