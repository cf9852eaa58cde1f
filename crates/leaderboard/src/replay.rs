use super::Entry;
use msr_core::ID;

/// Stored replay blob for a top-N entry: a board descriptor plus the
/// ordered step list, both kept verbatim as submitted.
#[derive(Debug, Clone)]
pub struct Replay {
    entry: ID<Entry>,
    board: serde_json::Value,
    steps: serde_json::Value,
}

impl Replay {
    pub fn new(entry: ID<Entry>, board: serde_json::Value, steps: serde_json::Value) -> Self {
        Self {
            entry,
            board,
            steps,
        }
    }
    pub fn entry(&self) -> ID<Entry> {
        self.entry
    }
    pub fn board(&self) -> &serde_json::Value {
        &self.board
    }
    pub fn steps(&self) -> &serde_json::Value {
        &self.steps
    }
}

mod schema {
    use super::*;
    use msr_database::*;

    impl Schema for Replay {
        fn name() -> &'static str {
            REPLAYS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                REPLAYS,
                " (
                    entry_id    UUID PRIMARY KEY REFERENCES ",
                LEADERBOARD,
                "(id) ON DELETE CASCADE,
                    board       JSONB NOT NULL,
                    steps       JSONB NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
    }
}
