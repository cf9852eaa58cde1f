use msr_auth::Member;
use msr_board::Difficulty;
use msr_board::Layout;
use msr_core::Coord;
use msr_core::ID;
use msr_core::Unique;
use std::time::Duration;
use std::time::SystemTime;

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Pending,
    Active,
    Finished,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

impl TryFrom<&str> for MatchStatus {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            other => Err(format!("unknown match status: {}", other)),
        }
    }
}

/// One shared game session: a fixed board descriptor plus its seats.
///
/// The board tuple `(width, height, mines, seed)` and the safe-start cell
/// are agreed once at create time and never change afterwards.
#[derive(Debug, Clone)]
pub struct Match {
    id: ID<Self>,
    status: MatchStatus,
    difficulty: Difficulty,
    width: Coord,
    height: Coord,
    mines: u16,
    seed: String,
    safe: (Coord, Coord),
    host: ID<Member>,
    countdown_secs: i32,
    created: SystemTime,
    started: Option<SystemTime>,
    ended: Option<SystemTime>,
    activity: Option<SystemTime>,
}

impl Match {
    /// A fresh pending match for a host. The safe-start cell is derived
    /// from the seed so that every client lands on the same layout.
    pub fn create(host: ID<Member>, difficulty: Difficulty, seed: String, countdown_secs: i32) -> Self {
        let (width, height, mines) = difficulty.dimensions();
        let safe = Layout::generate(width, height, mines, &seed).safe_start();
        Self {
            id: ID::default(),
            status: MatchStatus::Pending,
            difficulty,
            width,
            height,
            mines,
            seed,
            safe,
            host,
            countdown_secs,
            created: SystemTime::now(),
            started: None,
            ended: None,
            activity: None,
        }
    }
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ID<Self>,
        status: MatchStatus,
        difficulty: Difficulty,
        width: Coord,
        height: Coord,
        mines: u16,
        seed: String,
        safe: (Coord, Coord),
        host: ID<Member>,
        countdown_secs: i32,
        created: SystemTime,
        started: Option<SystemTime>,
        ended: Option<SystemTime>,
        activity: Option<SystemTime>,
    ) -> Self {
        Self {
            id,
            status,
            difficulty,
            width,
            height,
            mines,
            seed,
            safe,
            host,
            countdown_secs,
            created,
            started,
            ended,
            activity,
        }
    }
    pub fn status(&self) -> MatchStatus {
        self.status
    }
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
    pub fn width(&self) -> Coord {
        self.width
    }
    pub fn height(&self) -> Coord {
        self.height
    }
    pub fn mines(&self) -> u16 {
        self.mines
    }
    pub fn seed(&self) -> &str {
        &self.seed
    }
    pub fn safe_start(&self) -> (Coord, Coord) {
        self.safe
    }
    pub fn host(&self) -> ID<Member> {
        self.host
    }
    pub fn countdown_secs(&self) -> i32 {
        self.countdown_secs
    }
    pub fn created_at(&self) -> SystemTime {
        self.created
    }
    pub fn started_at(&self) -> Option<SystemTime> {
        self.started
    }
    pub fn ended_at(&self) -> Option<SystemTime> {
        self.ended
    }
    pub fn contains(&self, x: Coord, y: Coord) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }
    /// Rebuild the deterministic mine layout for ranking-time replay.
    pub fn layout(&self) -> Layout {
        Layout::generate(self.width, self.height, self.mines, &self.seed)
    }
    /// Whether the pre-start window still holds step writes back.
    pub fn clock_running(&self, now: SystemTime) -> bool {
        self.started.map(|t| now >= t).unwrap_or(false)
    }
    /// Latest activity watermark: the max of creation, start, and the
    /// last step or finish recorded against the match.
    pub fn last_activity(&self) -> SystemTime {
        [Some(self.created), self.started, self.activity]
            .into_iter()
            .flatten()
            .max()
            .expect("created_at is always present")
    }
    /// Whether an active match has gone idle past the allowance.
    pub fn idle_expired(&self, idle: Duration, now: SystemTime) -> bool {
        self.status == MatchStatus::Active && self.last_activity() + idle < now
    }
    /// Whether an active match has outlived its countdown.
    pub fn countdown_expired(&self, now: SystemTime) -> bool {
        self.status == MatchStatus::Active
            && self
                .started
                .map(|t| t + Duration::from_secs(self.countdown_secs.max(0) as u64) < now)
                .unwrap_or(false)
    }
}

impl Unique for Match {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use super::*;
    use msr_database::*;

    impl Schema for Match {
        fn name() -> &'static str {
            MATCHES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                MATCHES,
                " (
                    id             UUID PRIMARY KEY,
                    status         TEXT NOT NULL,
                    difficulty     TEXT NOT NULL,
                    width          SMALLINT NOT NULL,
                    height         SMALLINT NOT NULL,
                    mines          SMALLINT NOT NULL,
                    seed           TEXT NOT NULL,
                    safe_x         SMALLINT NOT NULL,
                    safe_y         SMALLINT NOT NULL,
                    host_id        UUID NOT NULL,
                    countdown_secs INTEGER NOT NULL,
                    created_at     TIMESTAMPTZ NOT NULL,
                    started_at     TIMESTAMPTZ,
                    ended_at       TIMESTAMPTZ,
                    last_step_at   TIMESTAMPTZ
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_matches_status ON ",
                MATCHES,
                " (status);
                 CREATE INDEX IF NOT EXISTS idx_matches_created ON ",
                MATCHES,
                " (created_at DESC);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Match {
        Match::create(ID::default(), Difficulty::Beginner, "abcabcabcabc".into(), 300)
    }

    #[test]
    fn created_pending_with_board() {
        let m = fresh();
        assert_eq!(m.status(), MatchStatus::Pending);
        assert_eq!(m.width(), 9);
        assert_eq!(m.height(), 9);
        assert_eq!(m.mines(), 10);
        assert!(m.started_at().is_none());
        assert!(m.ended_at().is_none());
    }
    #[test]
    fn safe_start_matches_layout() {
        let m = fresh();
        assert_eq!(m.safe_start(), m.layout().safe_start());
    }
    #[test]
    fn clock_respects_pre_start_window() {
        let mut m = fresh();
        let now = SystemTime::now();
        assert!(!m.clock_running(now));
        m.status = MatchStatus::Active;
        m.started = Some(now + Duration::from_secs(3));
        assert!(!m.clock_running(now));
        assert!(m.clock_running(now + Duration::from_secs(3)));
    }
    #[test]
    fn idle_expiry_only_when_active() {
        let mut m = fresh();
        let now = SystemTime::now();
        let idle = Duration::from_secs(600);
        assert!(!m.idle_expired(idle, now + Duration::from_secs(601)));
        m.status = MatchStatus::Active;
        assert!(m.idle_expired(idle, now + Duration::from_secs(7200)));
        assert!(!m.idle_expired(idle, now));
    }
    #[test]
    fn activity_watermark_defers_idle() {
        let mut m = fresh();
        m.status = MatchStatus::Active;
        let now = SystemTime::now();
        let idle = Duration::from_secs(600);
        m.activity = Some(now + Duration::from_secs(3600));
        assert!(!m.idle_expired(idle, now + Duration::from_secs(3700)));
        assert!(m.idle_expired(idle, now + Duration::from_secs(4201)));
    }
    #[test]
    fn countdown_expiry() {
        let mut m = fresh();
        let now = SystemTime::now();
        m.status = MatchStatus::Active;
        m.started = Some(now);
        assert!(!m.countdown_expired(now + Duration::from_secs(299)));
        assert!(m.countdown_expired(now + Duration::from_secs(301)));
    }
    #[test]
    fn status_names_round_trip() {
        for s in [MatchStatus::Pending, MatchStatus::Active, MatchStatus::Finished] {
            assert_eq!(MatchStatus::try_from(s.to_string().as_str()), Ok(s));
        }
    }
}
