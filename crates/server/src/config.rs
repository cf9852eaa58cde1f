use msr_engine::EngineConfig;
use std::time::Duration;

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Server configuration, read once from the environment at startup.
///
/// Recognized variables: `DB_URL`, `BIND_ADDR`, `CORS_ORIGINS`,
/// `JWT_SECRET`, `JWT_EXPIRES_MINUTES`, `UPLOAD_DIR`, `IDLE_MINUTES`,
/// `PRE_START_DELAY_SECS`, `COUNTDOWN_SECS`, `LEADERBOARD_TOP_N`,
/// `MAX_PLAYERS_PER_MATCH`.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub bind_addr: String,
    /// Allowed CORS origins; `*` (the default) allows any.
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expires_minutes: u64,
    /// Accepted for compatibility; nothing in the core reads it.
    pub upload_dir: String,
    pub idle_minutes: u64,
    pub pre_start_delay_secs: u64,
    pub countdown_secs: u64,
    pub leaderboard_top_n: i64,
    pub max_players_per_match: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            db_url: var("DB_URL").unwrap_or_default(),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cors_origins: var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| vec!["*".to_string()]),
            jwt_secret: var("JWT_SECRET").unwrap_or_default(),
            jwt_expires_minutes: parse("JWT_EXPIRES_MINUTES", 15),
            upload_dir: var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            idle_minutes: parse("IDLE_MINUTES", msr_core::IDLE_MINUTES),
            pre_start_delay_secs: parse("PRE_START_DELAY_SECS", msr_core::PRE_START_DELAY_SECS),
            countdown_secs: parse("COUNTDOWN_SECS", msr_core::COUNTDOWN_SECS),
            leaderboard_top_n: parse("LEADERBOARD_TOP_N", msr_core::LEADERBOARD_TOP_N),
            max_players_per_match: parse("MAX_PLAYERS_PER_MATCH", msr_core::MAX_PLAYERS_PER_MATCH),
        }
    }
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            idle: Duration::from_secs(self.idle_minutes * 60),
            pre_start: Duration::from_secs(self.pre_start_delay_secs),
            countdown_secs: self.countdown_secs as i32,
            max_players: self.max_players_per_match,
        }
    }
    pub fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_expires_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn engine_config_converts_units() {
        let mut config = Config::from_env();
        config.idle_minutes = 10;
        config.pre_start_delay_secs = 3;
        config.countdown_secs = 300;
        let engine = config.engine();
        assert_eq!(engine.idle, Duration::from_secs(600));
        assert_eq!(engine.pre_start, Duration::from_secs(3));
        assert_eq!(engine.countdown_secs, 300);
    }
}
