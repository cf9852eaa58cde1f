//! Data transfer objects for the minesrace HTTP API.
//!
//! Pure serde types; conversions from domain entities live with the
//! server handlers. Timestamps travel as epoch milliseconds.
mod request;
mod response;

pub use request::*;
pub use response::*;

use serde::Deserialize;
use serde::Serialize;

/// A board coordinate on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

/// The board agreement tuple served at create/join and in every match view.
///
/// The safe-start cell travels under both its snake_case and camelCase
/// names for mixed-case clients; either (or both) is accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSpec {
    pub width: i16,
    pub height: i16,
    pub mines: u16,
    pub seed: String,
    pub difficulty: String,
    #[serde(default)]
    pub safe_start: Option<Cell>,
    #[serde(rename = "safeStart", default)]
    pub safe_start_alias: Option<Cell>,
}

impl BoardSpec {
    pub fn new(
        width: i16,
        height: i16,
        mines: u16,
        seed: String,
        difficulty: String,
        safe_start: Cell,
    ) -> Self {
        Self {
            width,
            height,
            mines,
            seed,
            difficulty,
            safe_start: Some(safe_start),
            safe_start_alias: Some(safe_start),
        }
    }
    /// The agreed first-reveal cell, whichever key the sender used.
    pub fn safe_cell(&self) -> Cell {
        self.safe_start
            .or(self.safe_start_alias)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> BoardSpec {
        BoardSpec::new(
            9,
            9,
            10,
            "abc123def456".into(),
            "beginner".into(),
            Cell { x: 4, y: 5 },
        )
    }

    #[test]
    fn board_emits_both_safe_start_names() {
        let json = serde_json::to_value(spec()).expect("serialize");
        assert_eq!(json["safe_start"]["x"], 4);
        assert_eq!(json["safeStart"]["y"], 5);
    }
    #[test]
    fn board_accepts_snake_case() {
        let parsed: BoardSpec = serde_json::from_value(serde_json::json!({
            "width": 9, "height": 9, "mines": 10,
            "seed": "s", "difficulty": "beginner",
            "safe_start": {"x": 2, "y": 3},
        }))
        .expect("deserialize");
        assert_eq!(parsed.safe_cell(), Cell { x: 2, y: 3 });
    }
    #[test]
    fn board_accepts_camel_case() {
        let parsed: BoardSpec = serde_json::from_value(serde_json::json!({
            "width": 9, "height": 9, "mines": 10,
            "seed": "s", "difficulty": "beginner",
            "safeStart": {"x": 7, "y": 1},
        }))
        .expect("deserialize");
        assert_eq!(parsed.safe_cell(), Cell { x: 7, y: 1 });
    }
    #[test]
    fn board_round_trips_under_both_names() {
        let json = serde_json::to_string(&spec()).expect("serialize");
        let parsed: BoardSpec = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.safe_cell(), spec().safe_cell());
        assert_eq!(parsed.seed, spec().seed);
    }
}
