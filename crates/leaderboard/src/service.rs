use super::*;
use msr_auth::Member;
use msr_board::Difficulty;
use msr_core::ID;
use msr_core::Millis;
use msr_database::PgErr;
use std::sync::Arc;
use tokio_postgres::Client;

/// Leaderboard coordination: strictly-better upsert plus synchronous
/// top-N replay pruning after every recorded submission.
pub struct Leaderboard {
    db: Arc<Client>,
    top_n: i64,
}

impl Leaderboard {
    pub fn new(db: Arc<Client>, top_n: i64) -> Self {
        Self { db, top_n }
    }

    /// Records a submission. Returns false when the existing entry was
    /// already at least as fast and nothing changed.
    pub async fn submit(
        &self,
        user: ID<Member>,
        handle: &str,
        difficulty: Difficulty,
        time_ms: Millis,
        replay: Option<(serde_json::Value, serde_json::Value)>,
    ) -> Result<bool, PgErr> {
        let entry = Entry::create(user, handle.to_string(), difficulty, time_ms);
        let Some(id) = self.db.upsert(&entry).await? else {
            return Ok(false);
        };
        // The previous best's replay no longer describes the stored time.
        self.db.drop_replay(id).await?;
        if let Some((board, steps)) = replay {
            self.db.attach_replay(&Replay::new(id, board, steps)).await?;
        }
        let pruned = self.db.prune_replays(difficulty, self.top_n).await?;
        if pruned > 0 {
            log::debug!("[leaderboard] pruned {} {} replays", pruned, difficulty);
        }
        log::info!(
            "[leaderboard] {} recorded {}ms on {}",
            handle,
            time_ms,
            difficulty
        );
        Ok(true)
    }

    pub async fn ladder(
        &self,
        difficulty: Difficulty,
        limit: i64,
    ) -> Result<Vec<(Entry, bool)>, PgErr> {
        self.db.ladder(difficulty, limit).await
    }

    pub async fn replay(
        &self,
        entry: ID<Entry>,
    ) -> Result<Option<(serde_json::Value, serde_json::Value)>, PgErr> {
        self.db.replay(entry).await
    }
}
