use super::*;
use msr_auth::Member;
use msr_board::Difficulty;
use msr_core::Coord;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Rank;
use msr_core::Seq;
use msr_core::Unique;
use msr_database::*;
use std::sync::Arc;
use std::time::SystemTime;
use tokio_postgres::Client;
use tokio_postgres::Row;

const MATCH_COLUMNS: &str = "id, status, difficulty, width, height, mines, seed, safe_x, safe_y, \
     host_id, countdown_secs, created_at, started_at, ended_at, last_step_at";

const SEAT_COLUMNS: &str = "s.id, s.match_id, s.user_id, u.username, s.ready, s.result, \
     s.duration_ms, s.steps_count, s.finished_at, s.rank, s.progress, s.joined_at";

fn match_from(row: &Row) -> Match {
    Match::hydrate(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        MatchStatus::try_from(row.get::<_, &str>(1)).expect("persisted status is valid"),
        Difficulty::try_from(row.get::<_, &str>(2)).expect("persisted difficulty is valid"),
        row.get::<_, i16>(3),
        row.get::<_, i16>(4),
        row.get::<_, i16>(5) as u16,
        row.get::<_, String>(6),
        (row.get::<_, i16>(7), row.get::<_, i16>(8)),
        ID::from(row.get::<_, uuid::Uuid>(9)),
        row.get::<_, i32>(10),
        row.get::<_, SystemTime>(11),
        row.get::<_, Option<SystemTime>>(12),
        row.get::<_, Option<SystemTime>>(13),
        row.get::<_, Option<SystemTime>>(14),
    )
}

fn seat_from(row: &Row) -> Seat {
    Seat::hydrate(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        ID::from(row.get::<_, uuid::Uuid>(2)),
        row.get::<_, String>(3),
        row.get::<_, bool>(4),
        Outcome::try_from(row.get::<_, &str>(5)).expect("persisted result is valid"),
        row.get::<_, Option<Millis>>(6),
        row.get::<_, i32>(7),
        row.get::<_, Option<SystemTime>>(8),
        row.get::<_, Option<Rank>>(9),
        row.get::<_, Option<serde_json::Value>>(10),
        row.get::<_, SystemTime>(11),
    )
}

fn step_from(row: &Row) -> Step {
    Step::hydrate(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        row.get::<_, Seq>(2),
        StepAction::try_from(row.get::<_, &str>(3)).expect("persisted action is valid"),
        row.get::<_, Coord>(4),
        row.get::<_, Coord>(5),
        row.get::<_, Option<Millis>>(6),
        row.get::<_, SystemTime>(7),
    )
}

/// Repository trait for match coordination database operations.
/// Abstracts SQL from the coordination logic. Every mutation is a single
/// guarded statement so a failed write leaves the row untouched.
#[allow(async_fn_in_trait)]
pub trait MatchRepository {
    async fn create_match(&self, m: &Match) -> Result<(), PgErr>;
    async fn get_match(&self, id: ID<Match>) -> Result<Option<Match>, PgErr>;
    async fn recent_matches(&self, limit: i64) -> Result<Vec<Match>, PgErr>;
    async fn delete_match(&self, id: ID<Match>) -> Result<u64, PgErr>;
    /// Guarded pending → active transition; 0 rows means the guard lost.
    async fn start_match(&self, id: ID<Match>, started: SystemTime) -> Result<u64, PgErr>;
    async fn set_host(&self, id: ID<Match>, host: ID<Member>) -> Result<u64, PgErr>;
    /// Guarded active → finished claim; exactly one caller wins.
    async fn claim_finish(&self, id: ID<Match>, ended: SystemTime) -> Result<u64, PgErr>;

    async fn insert_seat(&self, seat: &Seat, token_hash: &[u8]) -> Result<(), PgErr>;
    async fn remove_seat(&self, seat: ID<Seat>) -> Result<u64, PgErr>;
    async fn get_seats(&self, id: ID<Match>) -> Result<Vec<Seat>, PgErr>;
    async fn seat_by_token(&self, id: ID<Match>, hash: &[u8]) -> Result<Option<Seat>, PgErr>;
    async fn set_ready(&self, seat: ID<Seat>, ready: bool) -> Result<u64, PgErr>;
    async fn set_ranks(&self, ranks: &[(ID<Seat>, Rank)]) -> Result<(), PgErr>;
    /// The active-session predicate: any seat of an unfinished match.
    async fn active_match_for(&self, user: ID<Member>) -> Result<Option<ID<Match>>, PgErr>;

    /// Atomically appends with the next per-match seq, bumps the seat's
    /// step counter, and refreshes the activity watermark.
    async fn insert_step(
        &self,
        id: ID<Match>,
        seat: ID<Seat>,
        action: StepAction,
        x: Coord,
        y: Coord,
        elapsed: Option<Millis>,
    ) -> Result<Seq, PgErr>;
    async fn get_steps(&self, id: ID<Match>) -> Result<Vec<Step>, PgErr>;

    /// Records a seat's end of game; 0 rows means it had already finished.
    #[allow(clippy::too_many_arguments)]
    async fn finish_seat(
        &self,
        seat: ID<Seat>,
        outcome: Outcome,
        duration: Option<Millis>,
        steps: Option<i32>,
        progress: Option<&serde_json::Value>,
        finished: SystemTime,
    ) -> Result<u64, PgErr>;
    /// Forfeits every seat that has not finished yet (timeout path).
    async fn forfeit_unfinished(&self, id: ID<Match>, at: SystemTime) -> Result<u64, PgErr>;
}

impl MatchRepository for Arc<Client> {
    async fn create_match(&self, m: &Match) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                MATCHES,
                " (id, status, difficulty, width, height, mines, seed, safe_x, safe_y, \
                   host_id, countdown_secs, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
            ),
            &[
                &m.id().inner(),
                &m.status().to_string(),
                &m.difficulty().to_string(),
                &m.width(),
                &m.height(),
                &(m.mines() as i16),
                &m.seed(),
                &m.safe_start().0,
                &m.safe_start().1,
                &m.host().inner(),
                &m.countdown_secs(),
                &m.created_at(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn get_match(&self, id: ID<Match>) -> Result<Option<Match>, PgErr> {
        self.query_opt(
            const_format::concatcp!("SELECT ", MATCH_COLUMNS, " FROM ", MATCHES, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(match_from))
    }

    async fn recent_matches(&self, limit: i64) -> Result<Vec<Match>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT ",
                MATCH_COLUMNS,
                " FROM ",
                MATCHES,
                " ORDER BY created_at DESC LIMIT $1"
            ),
            &[&limit],
        )
        .await
        .map(|rows| rows.iter().map(match_from).collect())
    }

    async fn delete_match(&self, id: ID<Match>) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", MATCHES, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
    }

    async fn start_match(&self, id: ID<Match>, started: SystemTime) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                MATCHES,
                " SET status = 'active', started_at = $2 WHERE id = $1 AND status = 'pending'"
            ),
            &[&id.inner(), &started],
        )
        .await
    }

    async fn set_host(&self, id: ID<Match>, host: ID<Member>) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!("UPDATE ", MATCHES, " SET host_id = $2 WHERE id = $1"),
            &[&id.inner(), &host.inner()],
        )
        .await
    }

    async fn claim_finish(&self, id: ID<Match>, ended: SystemTime) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                MATCHES,
                " SET status = 'finished', ended_at = $2 WHERE id = $1 AND status = 'active'"
            ),
            &[&id.inner(), &ended],
        )
        .await
    }

    async fn insert_seat(&self, seat: &Seat, token_hash: &[u8]) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                SEATS,
                " (id, match_id, user_id, token_hash, ready, result, steps_count, joined_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, 0, $7)"
            ),
            &[
                &seat.id().inner(),
                &seat.match_id().inner(),
                &seat.user().inner(),
                &token_hash,
                &seat.ready(),
                &seat.result().to_string(),
                &seat.joined_at(),
            ],
        )
        .await
        .map(|_| ())
    }

    async fn remove_seat(&self, seat: ID<Seat>) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", SEATS, " WHERE id = $1"),
            &[&seat.inner()],
        )
        .await
    }

    async fn get_seats(&self, id: ID<Match>) -> Result<Vec<Seat>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT ",
                SEAT_COLUMNS,
                " FROM ",
                SEATS,
                " s JOIN ",
                USERS,
                " u ON u.id = s.user_id WHERE s.match_id = $1 ORDER BY s.joined_at, s.id"
            ),
            &[&id.inner()],
        )
        .await
        .map(|rows| rows.iter().map(seat_from).collect())
    }

    async fn seat_by_token(&self, id: ID<Match>, hash: &[u8]) -> Result<Option<Seat>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT ",
                SEAT_COLUMNS,
                " FROM ",
                SEATS,
                " s JOIN ",
                USERS,
                " u ON u.id = s.user_id WHERE s.match_id = $1 AND s.token_hash = $2"
            ),
            &[&id.inner(), &hash],
        )
        .await
        .map(|opt| opt.as_ref().map(seat_from))
    }

    async fn set_ready(&self, seat: ID<Seat>, ready: bool) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!("UPDATE ", SEATS, " SET ready = $2 WHERE id = $1"),
            &[&seat.inner(), &ready],
        )
        .await
    }

    async fn set_ranks(&self, ranks: &[(ID<Seat>, Rank)]) -> Result<(), PgErr> {
        for (seat, rank) in ranks {
            self.execute(
                const_format::concatcp!("UPDATE ", SEATS, " SET rank = $2 WHERE id = $1"),
                &[&seat.inner(), rank],
            )
            .await?;
        }
        Ok(())
    }

    async fn active_match_for(&self, user: ID<Member>) -> Result<Option<ID<Match>>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT s.match_id FROM ",
                SEATS,
                " s JOIN ",
                MATCHES,
                " m ON m.id = s.match_id WHERE s.user_id = $1 AND m.status != 'finished' LIMIT 1"
            ),
            &[&user.inner()],
        )
        .await
        .map(|opt| opt.map(|row| ID::from(row.get::<_, uuid::Uuid>(0))))
    }

    async fn insert_step(
        &self,
        id: ID<Match>,
        seat: ID<Seat>,
        action: StepAction,
        x: Coord,
        y: Coord,
        elapsed: Option<Millis>,
    ) -> Result<Seq, PgErr> {
        // Single statement: the seq subquery, the seat counter, and the
        // activity watermark commit or fail together. UNIQUE (match_id, seq)
        // serializes concurrent allocations; the coordinator retries losers.
        self.query_one(
            const_format::concatcp!(
                "WITH new_step AS (
                    INSERT INTO ",
                STEPS,
                " (match_id, player_id, seq, action, x, y, elapsed_ms)
                     SELECT $1, $2, COALESCE(MAX(seq), 0) + 1, $3, $4, $5, $6
                     FROM ",
                STEPS,
                " WHERE match_id = $1
                     RETURNING seq
                ), bump AS (
                    UPDATE ",
                SEATS,
                " SET steps_count = steps_count + 1 WHERE id = $2
                )
                UPDATE ",
                MATCHES,
                " SET last_step_at = now() WHERE id = $1
                  RETURNING (SELECT seq FROM new_step)"
            ),
            &[
                &id.inner(),
                &seat.inner(),
                &action.to_string(),
                &x,
                &y,
                &elapsed,
            ],
        )
        .await
        .map(|row| row.get::<_, Seq>(0))
    }

    async fn get_steps(&self, id: ID<Match>) -> Result<Vec<Step>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT match_id, player_id, seq, action, x, y, elapsed_ms, created_at FROM ",
                STEPS,
                " WHERE match_id = $1 ORDER BY seq"
            ),
            &[&id.inner()],
        )
        .await
        .map(|rows| rows.iter().map(step_from).collect())
    }

    async fn finish_seat(
        &self,
        seat: ID<Seat>,
        outcome: Outcome,
        duration: Option<Millis>,
        steps: Option<i32>,
        progress: Option<&serde_json::Value>,
        finished: SystemTime,
    ) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!(
                "WITH done AS (
                    UPDATE ",
                SEATS,
                " SET result = $2, duration_ms = $3, steps_count = COALESCE($4, steps_count), \
                       progress = $5, finished_at = $6
                     WHERE id = $1 AND finished_at IS NULL
                     RETURNING match_id
                )
                UPDATE ",
                MATCHES,
                " SET last_step_at = $6 FROM done WHERE ",
                MATCHES,
                ".id = done.match_id"
            ),
            &[
                &seat.inner(),
                &outcome.to_string(),
                &duration,
                &steps,
                &progress,
                &finished,
            ],
        )
        .await
    }

    async fn forfeit_unfinished(&self, id: ID<Match>, at: SystemTime) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                SEATS,
                " SET result = 'forfeit', finished_at = $2 \
                 WHERE match_id = $1 AND finished_at IS NULL"
            ),
            &[&id.inner(), &at],
        )
        .await
    }
}
