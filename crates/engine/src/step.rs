use super::Match;
use super::Seat;
use msr_core::Coord;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Seq;
use std::time::SystemTime;

/// One client action in the match's total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Reveal,
    Flag,
    Chord,
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reveal => write!(f, "reveal"),
            Self::Flag => write!(f, "flag"),
            Self::Chord => write!(f, "chord"),
        }
    }
}

impl TryFrom<&str> for StepAction {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "reveal" => Ok(Self::Reveal),
            "flag" => Ok(Self::Flag),
            "chord" => Ok(Self::Chord),
            other => Err(format!("unknown step action: {}", other)),
        }
    }
}

/// Append-only log entry. `seq` is strictly increasing and contiguous per
/// match (not per seat); the global order is the canonical replay order.
#[derive(Debug, Clone)]
pub struct Step {
    match_id: ID<Match>,
    seat: ID<Seat>,
    seq: Seq,
    action: StepAction,
    x: Coord,
    y: Coord,
    elapsed: Option<Millis>,
    created: SystemTime,
}

impl Step {
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        match_id: ID<Match>,
        seat: ID<Seat>,
        seq: Seq,
        action: StepAction,
        x: Coord,
        y: Coord,
        elapsed: Option<Millis>,
        created: SystemTime,
    ) -> Self {
        Self {
            match_id,
            seat,
            seq,
            action,
            x,
            y,
            elapsed,
            created,
        }
    }
    pub fn match_id(&self) -> ID<Match> {
        self.match_id
    }
    pub fn seat(&self) -> ID<Seat> {
        self.seat
    }
    pub fn seq(&self) -> Seq {
        self.seq
    }
    pub fn action(&self) -> StepAction {
        self.action
    }
    pub fn x(&self) -> Coord {
        self.x
    }
    pub fn y(&self) -> Coord {
        self.y
    }
    pub fn elapsed_ms(&self) -> Option<Millis> {
        self.elapsed
    }
    pub fn created_at(&self) -> SystemTime {
        self.created
    }
}

mod schema {
    use super::*;
    use msr_database::*;

    impl Schema for Step {
        fn name() -> &'static str {
            STEPS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                STEPS,
                " (
                    match_id    UUID NOT NULL REFERENCES ",
                MATCHES,
                "(id) ON DELETE CASCADE,
                    player_id   UUID NOT NULL REFERENCES ",
                SEATS,
                "(id) ON DELETE CASCADE,
                    seq         INTEGER NOT NULL,
                    action      TEXT NOT NULL,
                    x           SMALLINT NOT NULL,
                    y           SMALLINT NOT NULL,
                    elapsed_ms  BIGINT,
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                    UNIQUE (match_id, seq)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_match_steps_match ON ",
                STEPS,
                " (match_id, seq);
                 CREATE INDEX IF NOT EXISTS idx_match_steps_player ON ",
                STEPS,
                " (player_id);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn action_names_round_trip() {
        for a in [StepAction::Reveal, StepAction::Flag, StepAction::Chord] {
            assert_eq!(StepAction::try_from(a.to_string().as_str()), Ok(a));
        }
    }
    #[test]
    fn unknown_action_rejected() {
        assert!(StepAction::try_from("detonate").is_err());
    }
}
