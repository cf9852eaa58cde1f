//! Conversions from domain entities to wire DTOs, including the
//! progress-redaction rule, plus the error-to-status mapping.
use msr_auth::Member;
use msr_core::ID;
use msr_core::Unique;
use msr_dto::*;
use msr_engine::EngineError;
use msr_engine::Match;
use msr_engine::Seat;
use msr_engine::Step;
use msr_engine::rules;
use actix_web::HttpResponse;
use std::time::SystemTime;

pub fn millis(t: SystemTime) -> i64 {
    t.duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub fn fail(e: EngineError) -> HttpResponse {
    match &e {
        EngineError::Unauthorized => HttpResponse::Unauthorized().body(e.to_string()),
        EngineError::NotFound => HttpResponse::NotFound().body(e.to_string()),
        EngineError::BadRequest(_) => HttpResponse::BadRequest().body(e.to_string()),
        EngineError::InvalidState(_) => HttpResponse::Conflict().body(e.to_string()),
        EngineError::AlreadyInMatch => HttpResponse::Conflict().body(e.to_string()),
        EngineError::Conflict => HttpResponse::Conflict().body(e.to_string()),
        EngineError::Unavailable(_) => HttpResponse::ServiceUnavailable().body(e.to_string()),
    }
}

pub fn board_of(m: &Match) -> BoardSpec {
    let (x, y) = m.safe_start();
    BoardSpec::new(
        m.width(),
        m.height(),
        m.mines(),
        m.seed().to_string(),
        m.difficulty().to_string(),
        Cell { x, y },
    )
}

pub fn envelope(m: &Match, seat: &Seat, token: String) -> SeatEnvelope {
    SeatEnvelope {
        match_id: m.id().to_string(),
        player_id: seat.id().to_string(),
        player_token: token,
        board: board_of(m),
        status: m.status().to_string(),
        countdown_secs: m.countdown_secs(),
        host_id: m.host().to_string(),
    }
}

pub fn seat_view(m: &Match, seat: &Seat, viewer: Option<ID<Member>>) -> SeatView {
    let progress = rules::progress_visible(m.status(), viewer, seat.user())
        .then(|| seat.progress().cloned())
        .flatten();
    SeatView {
        player_id: seat.id().to_string(),
        user_id: seat.user().to_string(),
        name: seat.handle().to_string(),
        ready: rules::is_ready(m, seat),
        result: seat.result().to_string(),
        rank: seat.rank(),
        steps_count: seat.steps_count(),
        duration_ms: seat.duration_ms(),
        finished_at: seat.finished_at().map(millis),
        progress,
    }
}

pub fn match_view(m: &Match, seats: &[Seat], viewer: Option<ID<Member>>) -> MatchView {
    MatchView {
        match_id: m.id().to_string(),
        status: m.status().to_string(),
        board: board_of(m),
        host_id: m.host().to_string(),
        countdown_secs: m.countdown_secs(),
        created_at: millis(m.created_at()),
        started_at: m.started_at().map(millis),
        ended_at: m.ended_at().map(millis),
        players: seats.iter().map(|s| seat_view(m, s, viewer)).collect(),
    }
}

pub fn summary(m: &Match, seats: &[Seat]) -> MatchSummary {
    MatchSummary {
        match_id: m.id().to_string(),
        status: m.status().to_string(),
        difficulty: m.difficulty().to_string(),
        created_at: millis(m.created_at()),
        players: seats
            .iter()
            .map(|s| SeatSummary {
                name: s.handle().to_string(),
                result: s.result().to_string(),
                rank: s.rank(),
            })
            .collect(),
    }
}

pub fn step_view(s: &Step) -> StepView {
    StepView {
        seq: s.seq(),
        player_id: s.seat().to_string(),
        action: s.action().to_string(),
        x: s.x(),
        y: s.y(),
        elapsed_ms: s.elapsed_ms(),
        created_at: millis(s.created_at()),
    }
}
