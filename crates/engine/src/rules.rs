//! Functional core: transition guards, host re-election, the win-coercion
//! heuristic, and view redaction. No I/O — everything here is exercised
//! directly by unit tests and driven by [`super::Coordinator`].
use super::*;
use msr_auth::Member;
use msr_core::Coord;
use msr_core::ID;
use msr_core::Unique;
use std::time::SystemTime;

/// A match accepts another seat only while pending and under capacity.
pub fn ensure_joinable(m: &Match, seated: usize, max: usize) -> Result<(), EngineError> {
    if m.status() != MatchStatus::Pending {
        return Err(EngineError::InvalidState(format!(
            "cannot join a {} match",
            m.status()
        )));
    }
    if seated >= max {
        return Err(EngineError::InvalidState("match is full".to_string()));
    }
    Ok(())
}

/// The host's readiness is implicit; everyone else toggles theirs.
pub fn is_ready(m: &Match, seat: &Seat) -> bool {
    seat.user() == m.host() || seat.ready()
}

/// Start requires the host, a pending match, at least two seats, and
/// every non-host seat ready.
pub fn ensure_startable(m: &Match, caller: &Seat, seats: &[Seat]) -> Result<(), EngineError> {
    if m.status() != MatchStatus::Pending {
        return Err(EngineError::InvalidState(format!(
            "cannot start a {} match",
            m.status()
        )));
    }
    if caller.user() != m.host() {
        return Err(EngineError::InvalidState(
            "only the host may start".to_string(),
        ));
    }
    if seats.len() < 2 {
        return Err(EngineError::InvalidState(
            "at least two players are required".to_string(),
        ));
    }
    if let Some(unready) = seats.iter().find(|s| !is_ready(m, s)) {
        return Err(EngineError::InvalidState(format!(
            "{} is not ready",
            unready.handle()
        )));
    }
    Ok(())
}

/// Leaving is allowed while pending, or after start but before the
/// pre-start window has elapsed.
pub fn ensure_leavable(m: &Match, now: SystemTime) -> Result<(), EngineError> {
    match m.status() {
        MatchStatus::Pending => Ok(()),
        MatchStatus::Active if !m.clock_running(now) => Ok(()),
        _ => Err(EngineError::InvalidState(
            "cannot leave once play has begun".to_string(),
        )),
    }
}

/// Steps land only on an active match whose clock is running, from a seat
/// that has not finished, at a coordinate inside the board.
pub fn ensure_steppable(
    m: &Match,
    seat: &Seat,
    x: Coord,
    y: Coord,
    now: SystemTime,
) -> Result<(), EngineError> {
    if m.status() != MatchStatus::Active {
        return Err(EngineError::InvalidState(format!(
            "cannot step in a {} match",
            m.status()
        )));
    }
    if !m.clock_running(now) {
        return Err(EngineError::InvalidState(
            "the countdown has not started".to_string(),
        ));
    }
    if seat.finished_at().is_some() {
        return Err(EngineError::InvalidState(
            "seat has already finished".to_string(),
        ));
    }
    if !m.contains(x, y) {
        return Err(EngineError::BadRequest(format!(
            "coordinate ({}, {}) is outside the board",
            x, y
        )));
    }
    Ok(())
}

/// Deterministic host re-election: the earliest-joined remaining seat,
/// seat id breaking exact-timestamp ties.
pub fn elect_host(seats: &[Seat]) -> Option<ID<Member>> {
    seats
        .iter()
        .min_by_key(|s| (s.joined_at(), s.id()))
        .map(|s| s.user())
}

/// Revealed non-mine cells evidenced by a submitted progress snapshot.
///
/// The snapshot is opaque to the store; this reads the
/// `{board: {cells: [...]}}` shape without validating cell semantics.
/// Cells may be a flat list or a list of rows.
pub fn revealed_cells(progress: &serde_json::Value) -> Option<usize> {
    let cells = progress.get("board")?.get("cells")?.as_array()?;
    let flat: Vec<&serde_json::Value> = match cells.first() {
        Some(serde_json::Value::Array(_)) => cells
            .iter()
            .filter_map(|row| row.as_array())
            .flatten()
            .collect(),
        _ => cells.iter().collect(),
    };
    Some(
        flat.iter()
            .filter(|c| c.get("revealed").and_then(|v| v.as_bool()).unwrap_or(false))
            .filter(|c| !c.get("mine").and_then(|v| v.as_bool()).unwrap_or(false))
            .count(),
    )
}

/// A claimed win must evidence a fully revealed safe area or it becomes a
/// forfeit. The server never replays the game here; it only counts
/// revealed cells in the submitted snapshot.
pub fn coerce(outcome: Outcome, progress: Option<&serde_json::Value>, safes: usize) -> Outcome {
    match outcome {
        Outcome::Win => match progress.and_then(revealed_cells) {
            Some(revealed) if revealed >= safes => Outcome::Win,
            _ => Outcome::Forfeit,
        },
        other => other,
    }
}

/// A seat's progress snapshot is visible to its owner at any time and to
/// everyone else only once the match is finished.
pub fn progress_visible(
    status: MatchStatus,
    viewer: Option<ID<Member>>,
    owner: ID<Member>,
) -> bool {
    status == MatchStatus::Finished || viewer == Some(owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use msr_board::Difficulty;
    use std::time::Duration;

    fn pending(host: ID<Member>) -> Match {
        Match::create(host, Difficulty::Beginner, "rulestestseed".into(), 300)
    }
    fn active(host: ID<Member>, started_ago: u64) -> Match {
        let now = SystemTime::now();
        Match::hydrate(
            ID::default(),
            MatchStatus::Active,
            Difficulty::Beginner,
            9,
            9,
            10,
            "rulestestseed".into(),
            (4, 4),
            host,
            300,
            now - Duration::from_secs(started_ago + 60),
            Some(now - Duration::from_secs(started_ago)),
            None,
            None,
        )
    }
    fn seat(m: &Match, user: ID<Member>, handle: &str) -> Seat {
        Seat::create(m.id(), user, handle.into())
    }
    fn ready_seat(m: &Match, user: ID<Member>, handle: &str) -> Seat {
        Seat::hydrate(
            ID::default(),
            m.id(),
            user,
            handle.into(),
            true,
            Outcome::None,
            None,
            0,
            None,
            None,
            None,
            SystemTime::now(),
        )
    }

    #[test]
    fn join_requires_pending() {
        let host = ID::default();
        assert!(ensure_joinable(&pending(host), 1, 2).is_ok());
        assert!(matches!(
            ensure_joinable(&active(host, 10), 1, 2),
            Err(EngineError::InvalidState(_))
        ));
    }
    #[test]
    fn join_respects_capacity() {
        let m = pending(ID::default());
        assert!(matches!(
            ensure_joinable(&m, 2, 2),
            Err(EngineError::InvalidState(_))
        ));
        assert!(ensure_joinable(&m, 2, 4).is_ok());
    }
    #[test]
    fn host_is_implicitly_ready() {
        let host = ID::default();
        let m = pending(host);
        let host_seat = seat(&m, host, "host");
        assert!(!host_seat.ready());
        assert!(is_ready(&m, &host_seat));
        let guest = seat(&m, ID::default(), "guest");
        assert!(!is_ready(&m, &guest));
    }
    #[test]
    fn start_needs_two_players() {
        let host = ID::default();
        let m = pending(host);
        let host_seat = seat(&m, host, "host");
        assert!(matches!(
            ensure_startable(&m, &host_seat, std::slice::from_ref(&host_seat)),
            Err(EngineError::InvalidState(_))
        ));
    }
    #[test]
    fn start_needs_every_guest_ready() {
        let host = ID::default();
        let m = pending(host);
        let host_seat = seat(&m, host, "host");
        let guest = seat(&m, ID::default(), "guest");
        let seats = vec![host_seat.clone(), guest];
        assert!(matches!(
            ensure_startable(&m, &host_seat, &seats),
            Err(EngineError::InvalidState(_))
        ));
        let ready = ready_seat(&m, ID::default(), "guest");
        let seats = vec![host_seat.clone(), ready];
        assert!(ensure_startable(&m, &host_seat, &seats).is_ok());
    }
    #[test]
    fn only_host_starts() {
        let host = ID::default();
        let m = pending(host);
        let host_seat = seat(&m, host, "host");
        let guest = ready_seat(&m, ID::default(), "guest");
        let seats = vec![host_seat, guest.clone()];
        assert!(matches!(
            ensure_startable(&m, &guest, &seats),
            Err(EngineError::InvalidState(_))
        ));
    }
    #[test]
    fn leave_blocked_once_clock_runs() {
        let host = ID::default();
        let now = SystemTime::now();
        assert!(ensure_leavable(&pending(host), now).is_ok());
        assert!(ensure_leavable(&active(host, 10), now).is_err());
        // Started but still inside the pre-start window.
        let m = Match::hydrate(
            ID::default(),
            MatchStatus::Active,
            Difficulty::Beginner,
            9,
            9,
            10,
            "rulestestseed".into(),
            (4, 4),
            host,
            300,
            now,
            Some(now + Duration::from_secs(3)),
            None,
            None,
        );
        assert!(ensure_leavable(&m, now).is_ok());
    }
    #[test]
    fn step_guards() {
        let host = ID::default();
        let now = SystemTime::now();
        let m = active(host, 10);
        let s = seat(&m, host, "host");
        assert!(ensure_steppable(&m, &s, 4, 4, now).is_ok());
        assert!(matches!(
            ensure_steppable(&m, &s, 9, 4, now),
            Err(EngineError::BadRequest(_))
        ));
        assert!(matches!(
            ensure_steppable(&m, &s, 4, -1, now),
            Err(EngineError::BadRequest(_))
        ));
        assert!(matches!(
            ensure_steppable(&pending(host), &s, 4, 4, now),
            Err(EngineError::InvalidState(_))
        ));
    }
    #[test]
    fn step_rejected_before_clock() {
        let host = ID::default();
        let now = SystemTime::now();
        let m = Match::hydrate(
            ID::default(),
            MatchStatus::Active,
            Difficulty::Beginner,
            9,
            9,
            10,
            "rulestestseed".into(),
            (4, 4),
            host,
            300,
            now,
            Some(now + Duration::from_secs(3)),
            None,
            None,
        );
        let s = seat(&m, host, "host");
        assert!(matches!(
            ensure_steppable(&m, &s, 4, 4, now),
            Err(EngineError::InvalidState(_))
        ));
    }
    #[test]
    fn step_rejected_after_own_finish() {
        let host = ID::default();
        let now = SystemTime::now();
        let m = active(host, 10);
        let s = Seat::hydrate(
            ID::default(),
            m.id(),
            host,
            "host".into(),
            true,
            Outcome::Lose,
            Some(4000),
            7,
            Some(now),
            None,
            None,
            now,
        );
        assert!(matches!(
            ensure_steppable(&m, &s, 4, 4, now),
            Err(EngineError::InvalidState(_))
        ));
    }
    #[test]
    fn host_reelection_picks_earliest_joined() {
        let m = pending(ID::default());
        let early = ID::default();
        let late = ID::default();
        let now = SystemTime::now();
        let a = Seat::hydrate(
            ID::default(),
            m.id(),
            late,
            "late".into(),
            false,
            Outcome::None,
            None,
            0,
            None,
            None,
            None,
            now,
        );
        let b = Seat::hydrate(
            ID::default(),
            m.id(),
            early,
            "early".into(),
            false,
            Outcome::None,
            None,
            0,
            None,
            None,
            None,
            now - Duration::from_secs(30),
        );
        assert_eq!(elect_host(&[a, b]), Some(early));
        assert_eq!(elect_host(&[]), None);
    }
    #[test]
    fn win_without_progress_forfeits() {
        assert_eq!(coerce(Outcome::Win, None, 71), Outcome::Forfeit);
    }
    #[test]
    fn win_with_partial_progress_forfeits() {
        let progress = serde_json::json!({"board": {"cells": [
            {"revealed": true, "mine": false},
            {"revealed": false, "mine": false},
        ], "status": "playing"}});
        assert_eq!(coerce(Outcome::Win, Some(&progress), 2), Outcome::Forfeit);
    }
    #[test]
    fn win_with_full_progress_stands() {
        let progress = serde_json::json!({"board": {"cells": [
            {"revealed": true, "mine": false},
            {"revealed": true, "mine": false},
            {"revealed": false, "mine": true},
        ], "status": "won"}});
        assert_eq!(coerce(Outcome::Win, Some(&progress), 2), Outcome::Win);
    }
    #[test]
    fn non_win_outcomes_pass_through() {
        assert_eq!(coerce(Outcome::Lose, None, 71), Outcome::Lose);
        assert_eq!(coerce(Outcome::Draw, None, 71), Outcome::Draw);
        assert_eq!(coerce(Outcome::Forfeit, None, 71), Outcome::Forfeit);
    }
    #[test]
    fn revealed_cells_reads_nested_rows() {
        let progress = serde_json::json!({"board": {"cells": [
            [{"revealed": true, "mine": false}, {"revealed": true, "mine": true}],
            [{"revealed": false, "mine": false}, {"revealed": true, "mine": false}],
        ]}});
        assert_eq!(revealed_cells(&progress), Some(2));
    }
    #[test]
    fn revealed_cells_tolerates_garbage() {
        assert_eq!(revealed_cells(&serde_json::json!({"huh": 1})), None);
        assert_eq!(
            revealed_cells(&serde_json::json!({"board": {"cells": "nope"}})),
            None
        );
    }
    #[test]
    fn progress_redaction() {
        let owner = ID::default();
        let stranger = ID::default();
        assert!(progress_visible(MatchStatus::Active, Some(owner), owner));
        assert!(!progress_visible(MatchStatus::Active, Some(stranger), owner));
        assert!(!progress_visible(MatchStatus::Active, None, owner));
        assert!(progress_visible(MatchStatus::Finished, None, owner));
        assert!(progress_visible(MatchStatus::Finished, Some(stranger), owner));
    }
}
