use super::Match;
use msr_auth::Member;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Rank;
use msr_core::Unique;
use std::time::SystemTime;

/// A player's recorded end of game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    None,
    Win,
    Lose,
    Draw,
    Forfeit,
}

impl Outcome {
    pub fn decided(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Win => write!(f, "win"),
            Self::Lose => write!(f, "lose"),
            Self::Draw => write!(f, "draw"),
            Self::Forfeit => write!(f, "forfeit"),
        }
    }
}

impl TryFrom<&str> for Outcome {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "none" => Ok(Self::None),
            "win" => Ok(Self::Win),
            "lose" => Ok(Self::Lose),
            "draw" => Ok(Self::Draw),
            "forfeit" => Ok(Self::Forfeit),
            other => Err(format!("unknown outcome: {}", other)),
        }
    }
}

/// One player's participation in a specific match.
///
/// The per-seat secret is issued once at create/join and lives in the
/// database only as a sha256 digest; it never appears on this type.
#[derive(Debug, Clone)]
pub struct Seat {
    id: ID<Self>,
    match_id: ID<Match>,
    user: ID<Member>,
    handle: String,
    ready: bool,
    result: Outcome,
    duration: Option<Millis>,
    steps: i32,
    finished: Option<SystemTime>,
    rank: Option<Rank>,
    progress: Option<serde_json::Value>,
    joined: SystemTime,
}

impl Seat {
    pub fn create(match_id: ID<Match>, user: ID<Member>, handle: String) -> Self {
        Self {
            id: ID::default(),
            match_id,
            user,
            handle,
            ready: false,
            result: Outcome::None,
            duration: None,
            steps: 0,
            finished: None,
            rank: None,
            progress: None,
            joined: SystemTime::now(),
        }
    }
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ID<Self>,
        match_id: ID<Match>,
        user: ID<Member>,
        handle: String,
        ready: bool,
        result: Outcome,
        duration: Option<Millis>,
        steps: i32,
        finished: Option<SystemTime>,
        rank: Option<Rank>,
        progress: Option<serde_json::Value>,
        joined: SystemTime,
    ) -> Self {
        Self {
            id,
            match_id,
            user,
            handle,
            ready,
            result,
            duration,
            steps,
            finished,
            rank,
            progress,
            joined,
        }
    }
    pub fn match_id(&self) -> ID<Match> {
        self.match_id
    }
    pub fn user(&self) -> ID<Member> {
        self.user
    }
    pub fn handle(&self) -> &str {
        &self.handle
    }
    pub fn ready(&self) -> bool {
        self.ready
    }
    pub fn result(&self) -> Outcome {
        self.result
    }
    pub fn duration_ms(&self) -> Option<Millis> {
        self.duration
    }
    pub fn steps_count(&self) -> i32 {
        self.steps
    }
    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished
    }
    pub fn rank(&self) -> Option<Rank> {
        self.rank
    }
    pub fn progress(&self) -> Option<&serde_json::Value> {
        self.progress.as_ref()
    }
    pub fn joined_at(&self) -> SystemTime {
        self.joined
    }
}

impl Unique for Seat {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use super::*;
    use msr_database::*;

    impl Schema for Seat {
        fn name() -> &'static str {
            SEATS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                SEATS,
                " (
                    id          UUID PRIMARY KEY,
                    match_id    UUID NOT NULL REFERENCES ",
                MATCHES,
                "(id) ON DELETE CASCADE,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id),
                    token_hash  BYTEA NOT NULL,
                    ready       BOOLEAN NOT NULL DEFAULT FALSE,
                    result      TEXT NOT NULL DEFAULT 'none',
                    duration_ms BIGINT,
                    steps_count INTEGER NOT NULL DEFAULT 0,
                    finished_at TIMESTAMPTZ,
                    rank        SMALLINT,
                    progress    JSONB,
                    joined_at   TIMESTAMPTZ NOT NULL,
                    UNIQUE (match_id, user_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_match_players_user ON ",
                SEATS,
                " (user_id);
                 CREATE INDEX IF NOT EXISTS idx_match_players_match ON ",
                SEATS,
                " (match_id, joined_at);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_seat_is_unready_and_undecided() {
        let seat = Seat::create(ID::default(), ID::default(), "someone".into());
        assert!(!seat.ready());
        assert_eq!(seat.result(), Outcome::None);
        assert!(seat.finished_at().is_none());
        assert!(seat.rank().is_none());
        assert_eq!(seat.steps_count(), 0);
    }
    #[test]
    fn outcome_names_round_trip() {
        for o in [
            Outcome::None,
            Outcome::Win,
            Outcome::Lose,
            Outcome::Draw,
            Outcome::Forfeit,
        ] {
            assert_eq!(Outcome::try_from(o.to_string().as_str()), Ok(o));
        }
    }
    #[test]
    fn only_none_is_undecided() {
        assert!(!Outcome::None.decided());
        assert!(Outcome::Win.decided());
        assert!(Outcome::Forfeit.decided());
    }
}
