//! Represents a named campus zone that groups parking spots.

use crate::errors::FieldErrors;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A campus region. Spots reference regions by name, not by id.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Region {
    /// Generated integer primary key.
    pub id: i64,

    /// Region name (e.g. "North").
    pub name: String,
}

/// Write payload for creating or replacing a region.
#[derive(Debug, Deserialize)]
pub struct RegionBody {
    pub name: String,
}

impl RegionBody {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors
                .entry("name")
                .or_default()
                .push("The name field is required.".into());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
