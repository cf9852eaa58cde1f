use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadyRequest {
    pub player_token: String,
    pub ready: bool,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub player_token: String,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub player_token: String,
    pub action: String,
    pub x: i16,
    pub y: i16,
    pub elapsed_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FinishRequest {
    pub player_token: String,
    pub outcome: String,
    pub duration_ms: Option<i64>,
    pub steps_count: Option<i32>,
    pub progress: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub player_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub difficulty: String,
    pub time_ms: i64,
    pub replay: Option<ReplayBlob>,
}

/// Replay payload: an opaque board descriptor plus the ordered step list.
#[derive(Debug, Deserialize)]
pub struct ReplayBlob {
    pub board: serde_json::Value,
    pub steps: serde_json::Value,
}
