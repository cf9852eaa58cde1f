use super::*;
use msr_board::Difficulty;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Unique;
use msr_database::*;
use std::sync::Arc;
use std::time::SystemTime;
use tokio_postgres::Client;
use tokio_postgres::Row;

fn entry_from(row: &Row) -> Entry {
    Entry::hydrate(
        ID::from(row.get::<_, uuid::Uuid>(0)),
        ID::from(row.get::<_, uuid::Uuid>(1)),
        row.get::<_, String>(2),
        Difficulty::try_from(row.get::<_, &str>(3)).expect("persisted difficulty is valid"),
        row.get::<_, Millis>(4),
        row.get::<_, SystemTime>(5),
    )
}

/// Repository trait for leaderboard database operations.
#[allow(async_fn_in_trait)]
pub trait LeaderboardRepository {
    /// Strictly-better upsert. Returns the surviving row id when the
    /// submission was recorded, `None` when the existing time stands.
    async fn upsert(&self, entry: &Entry) -> Result<Option<ID<Entry>>, PgErr>;
    async fn drop_replay(&self, entry: ID<Entry>) -> Result<u64, PgErr>;
    async fn attach_replay(&self, replay: &Replay) -> Result<(), PgErr>;
    /// Deletes replays whose entry is outside the top `keep` window for
    /// the difficulty.
    async fn prune_replays(&self, difficulty: Difficulty, keep: i64) -> Result<u64, PgErr>;
    /// Ladder for a difficulty, best time first, with replay availability.
    async fn ladder(
        &self,
        difficulty: Difficulty,
        limit: i64,
    ) -> Result<Vec<(Entry, bool)>, PgErr>;
    async fn replay(&self, entry: ID<Entry>)
    -> Result<Option<(serde_json::Value, serde_json::Value)>, PgErr>;
}

impl LeaderboardRepository for Arc<Client> {
    async fn upsert(&self, entry: &Entry) -> Result<Option<ID<Entry>>, PgErr> {
        // ON CONFLICT keeps the existing row id so a stored replay cascades
        // away only when explicitly dropped; the WHERE clause enforces the
        // strictly-better rule inside the statement.
        self.query_opt(
            const_format::concatcp!(
                "INSERT INTO ",
                LEADERBOARD,
                " (id, user_id, difficulty, time_ms, created_at) VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (user_id, difficulty) DO UPDATE
                    SET time_ms = EXCLUDED.time_ms, created_at = EXCLUDED.created_at
                    WHERE ",
                LEADERBOARD,
                ".time_ms > EXCLUDED.time_ms
                 RETURNING id"
            ),
            &[
                &entry.id().inner(),
                &entry.user().inner(),
                &entry.difficulty().to_string(),
                &entry.time_ms(),
                &entry.created_at(),
            ],
        )
        .await
        .map(|opt| opt.map(|row| ID::from(row.get::<_, uuid::Uuid>(0))))
    }

    async fn drop_replay(&self, entry: ID<Entry>) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", REPLAYS, " WHERE entry_id = $1"),
            &[&entry.inner()],
        )
        .await
    }

    async fn attach_replay(&self, replay: &Replay) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                REPLAYS,
                " (entry_id, board, steps) VALUES ($1, $2, $3)
                 ON CONFLICT (entry_id) DO UPDATE SET board = EXCLUDED.board, steps = EXCLUDED.steps"
            ),
            &[&replay.entry().inner(), &replay.board(), &replay.steps()],
        )
        .await
        .map(|_| ())
    }

    async fn prune_replays(&self, difficulty: Difficulty, keep: i64) -> Result<u64, PgErr> {
        self.execute(
            const_format::concatcp!(
                "DELETE FROM ",
                REPLAYS,
                " r USING ",
                LEADERBOARD,
                " e WHERE r.entry_id = e.id AND e.difficulty = $1 AND r.entry_id NOT IN (
                    SELECT id FROM ",
                LEADERBOARD,
                " WHERE difficulty = $1 ORDER BY time_ms, created_at LIMIT $2
                 )"
            ),
            &[&difficulty.to_string(), &keep],
        )
        .await
    }

    async fn ladder(
        &self,
        difficulty: Difficulty,
        limit: i64,
    ) -> Result<Vec<(Entry, bool)>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT e.id, e.user_id, u.username, e.difficulty, e.time_ms, e.created_at, \
                        (r.entry_id IS NOT NULL) AS has_replay
                 FROM ",
                LEADERBOARD,
                " e JOIN ",
                USERS,
                " u ON u.id = e.user_id LEFT JOIN ",
                REPLAYS,
                " r ON r.entry_id = e.id
                 WHERE e.difficulty = $1 ORDER BY e.time_ms, e.created_at LIMIT $2"
            ),
            &[&difficulty.to_string(), &limit],
        )
        .await
        .map(|rows| {
            rows.iter()
                .map(|row| (entry_from(row), row.get::<_, bool>(6)))
                .collect()
        })
    }

    async fn replay(
        &self,
        entry: ID<Entry>,
    ) -> Result<Option<(serde_json::Value, serde_json::Value)>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT board, steps FROM ",
                REPLAYS,
                " WHERE entry_id = $1"
            ),
            &[&entry.inner()],
        )
        .await
        .map(|opt| {
            opt.map(|row| {
                (
                    row.get::<_, serde_json::Value>(0),
                    row.get::<_, serde_json::Value>(1),
                )
            })
        })
    }
}
