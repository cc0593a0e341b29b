//! Represents a single parking spot within a region.

use crate::errors::FieldErrors;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A parking spot.
///
/// `occupied` is the only field the service mutates on its own: it tracks
/// whether some student currently holds the spot and must never be set
/// directly by a client.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    /// Generated integer primary key.
    pub id: i64,

    /// Name of the region this spot belongs to.
    pub region: String,

    /// Short display name (e.g. "A1"), at most 10 characters.
    pub name: String,

    /// Vehicle type the spot accepts ("car" unless stated otherwise).
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Free-form street address.
    pub address: String,

    /// Whether a student currently holds this spot.
    pub occupied: bool,
}

/// Write payload for creating or replacing a spot.
///
/// `occupied` is not accepted from clients: on create it starts false, on
/// update the stored value is preserved.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotBody {
    pub region: String,
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

fn default_kind() -> String {
    "car".into()
}

const SPOT_NAME_MAX_LEN: usize = 10;

impl SpotBody {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.region.trim().is_empty() {
            errors
                .entry("region")
                .or_default()
                .push("The region field is required.".into());
        }
        if self.name.trim().is_empty() {
            errors
                .entry("name")
                .or_default()
                .push("The name field is required.".into());
        } else if self.name.len() > SPOT_NAME_MAX_LEN {
            errors.entry("name").or_default().push(format!(
                "The name field must be at most {} characters long.",
                SPOT_NAME_MAX_LEN
            ));
        }
        if self.address.trim().is_empty() {
            errors
                .entry("address")
                .or_default()
                .push("The address field is required.".into());
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str) -> SpotBody {
        SpotBody {
            region: "North".into(),
            name: name.into(),
            kind: default_kind(),
            latitude: 0.0,
            longitude: 0.0,
            address: "x".into(),
        }
    }

    #[test]
    fn accepts_short_names() {
        assert!(body("A1").validate().is_ok());
    }

    #[test]
    fn rejects_names_over_ten_characters() {
        let errors = body("ABCDEFGHIJK").validate().unwrap_err();
        assert!(errors.contains_key("name"));
    }

    #[test]
    fn rejects_missing_region_and_address() {
        let mut b = body("A1");
        b.region = "".into();
        b.address = "  ".into();
        let errors = b.validate().unwrap_err();
        assert!(errors.contains_key("region"));
        assert!(errors.contains_key("address"));
    }
}
