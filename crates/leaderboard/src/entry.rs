use msr_auth::Member;
use msr_board::Difficulty;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Unique;
use std::time::SystemTime;

/// One user's best recorded time for a difficulty.
#[derive(Debug, Clone)]
pub struct Entry {
    id: ID<Self>,
    user: ID<Member>,
    handle: String,
    difficulty: Difficulty,
    time: Millis,
    created: SystemTime,
}

impl Entry {
    pub fn create(user: ID<Member>, handle: String, difficulty: Difficulty, time: Millis) -> Self {
        Self {
            id: ID::default(),
            user,
            handle,
            difficulty,
            time,
            created: SystemTime::now(),
        }
    }
    pub fn hydrate(
        id: ID<Self>,
        user: ID<Member>,
        handle: String,
        difficulty: Difficulty,
        time: Millis,
        created: SystemTime,
    ) -> Self {
        Self {
            id,
            user,
            handle,
            difficulty,
            time,
            created,
        }
    }
    pub fn user(&self) -> ID<Member> {
        self.user
    }
    pub fn handle(&self) -> &str {
        &self.handle
    }
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
    pub fn time_ms(&self) -> Millis {
        self.time
    }
    pub fn created_at(&self) -> SystemTime {
        self.created
    }
}

impl Unique for Entry {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use super::*;
    use msr_database::*;

    impl Schema for Entry {
        fn name() -> &'static str {
            LEADERBOARD
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                LEADERBOARD,
                " (
                    id          UUID PRIMARY KEY,
                    user_id     UUID NOT NULL REFERENCES ",
                USERS,
                "(id) ON DELETE CASCADE,
                    difficulty  TEXT NOT NULL,
                    time_ms     BIGINT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL,
                    UNIQUE (user_id, difficulty)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_leaderboard_ladder ON ",
                LEADERBOARD,
                " (difficulty, time_ms, created_at);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_entry_carries_submission() {
        let entry = Entry::create(ID::default(), "someone".into(), Difficulty::Beginner, 30000);
        assert_eq!(entry.time_ms(), 30000);
        assert_eq!(entry.difficulty(), Difficulty::Beginner);
        assert_eq!(entry.handle(), "someone");
    }
}
