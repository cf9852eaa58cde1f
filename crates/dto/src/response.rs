use super::BoardSpec;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Envelope returned by create and join: everything a client needs to
/// poll and play its seat. The token appears here and nowhere else.
#[derive(Debug, Serialize)]
pub struct SeatEnvelope {
    pub match_id: String,
    pub player_id: String,
    pub player_token: String,
    pub board: BoardSpec,
    pub status: String,
    pub countdown_secs: i32,
    pub host_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub status: String,
    pub started_at: i64,
    pub countdown_secs: i32,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub seq: i32,
}

#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i16>,
}

#[derive(Debug, Serialize)]
pub struct MatchView {
    pub match_id: String,
    pub status: String,
    pub board: BoardSpec,
    pub host_id: String,
    pub countdown_secs: i32,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub players: Vec<SeatView>,
}

#[derive(Debug, Serialize)]
pub struct SeatView {
    pub player_id: String,
    pub user_id: String,
    pub name: String,
    pub ready: bool,
    pub result: String,
    pub rank: Option<i16>,
    pub steps_count: i32,
    pub duration_ms: Option<i64>,
    pub finished_at: Option<i64>,
    /// Redacted (null) for opponents until the match is finished.
    pub progress: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub status: String,
    pub difficulty: String,
    pub created_at: i64,
    pub players: Vec<SeatSummary>,
}

#[derive(Debug, Serialize)]
pub struct SeatSummary {
    pub name: String,
    pub result: String,
    pub rank: Option<i16>,
}

#[derive(Debug, Serialize)]
pub struct StepView {
    pub seq: i32,
    pub player_id: String,
    pub action: String,
    pub x: i16,
    pub y: i16,
    pub elapsed_ms: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
pub struct ActiveResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
}

impl ActiveResponse {
    pub fn idle() -> Self {
        Self {
            active: false,
            match_id: None,
            player_id: None,
            board: None,
            status: None,
            host_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub improved: bool,
}

#[derive(Debug, Serialize)]
pub struct EntryView {
    pub entry_id: String,
    pub name: String,
    pub time_ms: i64,
    pub created_at: i64,
    pub has_replay: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayView {
    pub board: serde_json::Value,
    pub steps: serde_json::Value,
}
