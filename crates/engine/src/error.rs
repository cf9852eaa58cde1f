use msr_database::PgErr;

/// Errors surfaced by match coordination, independent of transport.
/// The server maps each kind onto an HTTP status at the boundary.
#[derive(Debug)]
pub enum EngineError {
    /// Token does not match a seat of the match.
    Unauthorized,
    /// Match or entity does not exist.
    NotFound,
    /// Malformed input: out-of-board coordinate, unknown action or
    /// difficulty, undecided outcome.
    BadRequest(String),
    /// Transition not allowed in the current lifecycle state.
    InvalidState(String),
    /// The user already occupies a seat in an unfinished match.
    AlreadyInMatch,
    /// Step sequence allocation lost every retry.
    Conflict,
    /// The store failed in a way the caller cannot fix.
    Unavailable(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "token does not match a seat"),
            Self::NotFound => write!(f, "not found"),
            Self::BadRequest(s) => write!(f, "bad request: {}", s),
            Self::InvalidState(s) => write!(f, "invalid state: {}", s),
            Self::AlreadyInMatch => write!(f, "already in an unfinished match"),
            Self::Conflict => write!(f, "step sequence contention, retry"),
            Self::Unavailable(s) => write!(f, "store unavailable: {}", s),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<PgErr> for EngineError {
    fn from(e: PgErr) -> Self {
        Self::Unavailable(e.to_string())
    }
}
