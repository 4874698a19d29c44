mod day;
mod ledger;
mod store;

use serde::{Deserialize, Serialize};

pub use day::{Clock, DayKey, ManualClock, STORAGE_PREFIX, SystemClock};
pub use ledger::{SKY_FRACTION, SKY_TOP_MARGIN, StarAdded, StarLedger};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// One released thought, reduced to where its star sits and when it rose.
/// The text itself is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Size of the area stars are placed in, sampled when the star is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBounds {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_star() -> Star {
        Star {
            id: "2f1c9a4e".to_string(),
            x: 412.5,
            y: 180.25,
            created_at: 1_709_985_600_000,
        }
    }

    #[test]
    fn test_star_uses_camel_case_fields() {
        let json = serde_json::to_value(sample_star()).expect("serialize");
        assert_eq!(json["createdAt"], 1_709_985_600_000i64);
        assert_eq!(json["id"], "2f1c9a4e");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_star_array_round_trip() {
        let stars = vec![sample_star(), Star {
            id: "b".to_string(),
            ..sample_star()
        }];
        let json = serde_json::to_string(&stars).expect("serialize");
        let decoded: Vec<Star> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, stars);
    }

    #[test]
    fn test_star_accepts_integer_coordinates() {
        let json = r#"[{"id":"1709985600000","x":300,"y":50,"createdAt":1709985600000}]"#;
        let decoded: Vec<Star> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(decoded[0].x, 300.0);
        assert_eq!(decoded[0].y, 50.0);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::InvalidKey("../x".to_string());
        assert_eq!(err.to_string(), "Invalid storage key '../x'");
    }
}
