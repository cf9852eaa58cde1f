use msr_core::ID;
use msr_core::Unique;

/// Registered user with verified identity.
/// The handle is unique and case-preserving.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    id: ID<Self>,
    handle: String,
    created: std::time::SystemTime,
}

impl Member {
    pub fn new(id: ID<Self>, handle: String, created: std::time::SystemTime) -> Self {
        Self {
            id,
            handle,
            created,
        }
    }
    pub fn handle(&self) -> &str {
        &self.handle
    }
    pub fn created_at(&self) -> std::time::SystemTime {
        self.created
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use super::*;
    use msr_database::*;

    /// Schema implementation for Member (users table).
    /// Note: hashword is a database-only field, not part of Member domain type.
    impl Schema for Member {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          UUID PRIMARY KEY,
                    username    VARCHAR(32) UNIQUE NOT NULL,
                    hashword    TEXT NOT NULL,
                    created_at  TIMESTAMPTZ NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_username ON ",
                USERS,
                " (username);"
            )
        }
    }
}
