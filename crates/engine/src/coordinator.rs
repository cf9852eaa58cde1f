use super::*;
use msr_auth::Crypto;
use msr_auth::Member;
use msr_board::Difficulty;
use msr_core::Coord;
use msr_core::ID;
use msr_core::Millis;
use msr_core::Rank;
use msr_core::Seq;
use msr_core::Unique;
use rand::Rng as _;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;
use tokio_postgres::Client;

/// Tunables for match coordination, filled from server configuration.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub idle: Duration,
    pub pre_start: Duration,
    pub countdown_secs: i32,
    pub max_players: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(msr_core::IDLE_MINUTES * 60),
            pre_start: Duration::from_secs(msr_core::PRE_START_DELAY_SECS),
            countdown_secs: msr_core::COUNTDOWN_SECS as i32,
            max_players: msr_core::MAX_PLAYERS_PER_MATCH,
        }
    }
}

/// Characters in a per-seat secret.
const TOKEN_LEN: usize = 32;

fn mint_token() -> String {
    let mut rng = rand::rngs::SmallRng::from_os_rng();
    (0..TOKEN_LEN)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/// Imperative shell for match coordination.
///
/// Owns the store handle and drives the functional core ([`rules`],
/// [`ranking`]) through [`MatchRepository`]. Idle and countdown timers are
/// evaluated lazily by [`Coordinator::touched`] on every operation that
/// reaches a match.
pub struct Coordinator {
    db: Arc<Client>,
    config: EngineConfig,
}

impl Coordinator {
    pub fn new(db: Arc<Client>, config: EngineConfig) -> Self {
        Self { db, config }
    }
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads a match and applies the lazy timeout evaluation: an active
    /// match past its idle allowance or countdown is force-finished before
    /// the caller sees it.
    pub async fn touched(&self, id: ID<Match>) -> Result<Match, EngineError> {
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        let now = SystemTime::now();
        if m.idle_expired(self.config.idle, now) || m.countdown_expired(now) {
            log::info!("[match {}] timed out, forcing finish", id);
            self.db.forfeit_unfinished(id, now).await?;
            self.finalize(id).await?;
            return self.db.get_match(id).await?.ok_or(EngineError::NotFound);
        }
        Ok(m)
    }

    pub async fn create(
        &self,
        user: ID<Member>,
        handle: &str,
        difficulty: Option<&str>,
    ) -> Result<(Match, Seat, String), EngineError> {
        if self.db.active_match_for(user).await?.is_some() {
            return Err(EngineError::AlreadyInMatch);
        }
        let difficulty = match difficulty {
            Some(name) => Difficulty::try_from(name).map_err(EngineError::BadRequest)?,
            None => Difficulty::default(),
        };
        let seed = msr_board::generate();
        let m = Match::create(user, difficulty, seed, self.config.countdown_secs);
        self.db.create_match(&m).await?;
        let seat = Seat::create(m.id(), user, handle.to_string());
        let token = mint_token();
        self.db.insert_seat(&seat, &Crypto::hash(&token)).await?;
        log::info!("[match {}] created by {} ({})", m.id(), handle, difficulty);
        Ok((m, seat, token))
    }

    pub async fn join(
        &self,
        id: ID<Match>,
        user: ID<Member>,
        handle: &str,
    ) -> Result<(Match, Seat, String), EngineError> {
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        if self.db.active_match_for(user).await?.is_some() {
            return Err(EngineError::AlreadyInMatch);
        }
        let seats = self.db.get_seats(id).await?;
        rules::ensure_joinable(&m, seats.len(), self.config.max_players)?;
        let seat = Seat::create(id, user, handle.to_string());
        let token = mint_token();
        self.db.insert_seat(&seat, &Crypto::hash(&token)).await?;
        log::info!("[match {}] {} joined", id, handle);
        Ok((m, seat, token))
    }

    pub async fn ready(
        &self,
        id: ID<Match>,
        token: &str,
        ready: bool,
    ) -> Result<(), EngineError> {
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        let seat = self
            .db
            .seat_by_token(id, &Crypto::hash(token))
            .await?
            .ok_or(EngineError::Unauthorized)?;
        if m.status() != MatchStatus::Pending {
            return Err(EngineError::InvalidState(format!(
                "cannot change readiness in a {} match",
                m.status()
            )));
        }
        // The host's readiness is implicit; the toggle is a no-op.
        if seat.user() == m.host() {
            return Ok(());
        }
        self.db.set_ready(seat.id(), ready).await?;
        Ok(())
    }

    pub async fn start(&self, id: ID<Match>, token: &str) -> Result<Match, EngineError> {
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        let caller = self
            .db
            .seat_by_token(id, &Crypto::hash(token))
            .await?
            .ok_or(EngineError::Unauthorized)?;
        let seats = self.db.get_seats(id).await?;
        rules::ensure_startable(&m, &caller, &seats)?;
        let started = SystemTime::now() + self.config.pre_start;
        if self.db.start_match(id, started).await? == 0 {
            return Err(EngineError::InvalidState(
                "match is no longer pending".to_string(),
            ));
        }
        log::info!("[match {}] started by {}", id, caller.handle());
        self.db.get_match(id).await?.ok_or(EngineError::NotFound)
    }

    /// Returns true when the departing seat was the last one and the match
    /// was deleted outright.
    pub async fn leave(&self, id: ID<Match>, token: &str) -> Result<bool, EngineError> {
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        let seat = self
            .db
            .seat_by_token(id, &Crypto::hash(token))
            .await?
            .ok_or(EngineError::Unauthorized)?;
        rules::ensure_leavable(&m, SystemTime::now())?;
        let seats = self.db.get_seats(id).await?;
        if seats.len() <= 1 {
            self.db.delete_match(id).await?;
            log::info!("[match {}] deleted on last leave", id);
            return Ok(true);
        }
        self.db.remove_seat(seat.id()).await?;
        if seat.user() == m.host() {
            let remaining: Vec<Seat> = seats
                .into_iter()
                .filter(|s| s.id() != seat.id())
                .collect();
            if let Some(host) = rules::elect_host(&remaining) {
                self.db.set_host(id, host).await?;
                log::info!("[match {}] host re-elected after leave", id);
            }
        }
        Ok(false)
    }

    pub async fn step(
        &self,
        id: ID<Match>,
        token: &str,
        action: &str,
        x: Coord,
        y: Coord,
        elapsed: Option<Millis>,
    ) -> Result<Seq, EngineError> {
        let m = self.touched(id).await?;
        let seat = self
            .db
            .seat_by_token(id, &Crypto::hash(token))
            .await?
            .ok_or(EngineError::Unauthorized)?;
        let action = StepAction::try_from(action).map_err(EngineError::BadRequest)?;
        rules::ensure_steppable(&m, &seat, x, y, SystemTime::now())?;
        for attempt in 0..msr_core::SEQ_RETRIES {
            match self
                .db
                .insert_step(id, seat.id(), action, x, y, elapsed)
                .await
            {
                Ok(seq) => return Ok(seq),
                Err(e) if is_unique_violation(&e) => {
                    log::debug!("[match {}] seq contention, attempt {}", id, attempt + 1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::Conflict)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn finish(
        &self,
        id: ID<Match>,
        token: &str,
        outcome: &str,
        duration: Option<Millis>,
        steps: Option<i32>,
        progress: Option<serde_json::Value>,
    ) -> Result<(Match, Option<Rank>), EngineError> {
        let m = self.touched(id).await?;
        let seat = self
            .db
            .seat_by_token(id, &Crypto::hash(token))
            .await?
            .ok_or(EngineError::Unauthorized)?;
        let outcome = Outcome::try_from(outcome).map_err(EngineError::BadRequest)?;
        if !outcome.decided() {
            return Err(EngineError::BadRequest(
                "outcome must be decided".to_string(),
            ));
        }
        match m.status() {
            MatchStatus::Active => {}
            // Repeating a finish is a no-op for the caller.
            MatchStatus::Finished => return Ok((m, seat.rank())),
            MatchStatus::Pending => {
                return Err(EngineError::InvalidState(
                    "cannot finish a pending match".to_string(),
                ));
            }
        }
        // A win must evidence a fully revealed safe area or it forfeits.
        let outcome = rules::coerce(outcome, progress.as_ref(), m.layout().safes());
        let recorded = self
            .db
            .finish_seat(
                seat.id(),
                outcome,
                duration,
                steps,
                progress.as_ref(),
                SystemTime::now(),
            )
            .await?;
        if recorded > 0 {
            log::info!("[match {}] {} finished: {}", id, seat.handle(), outcome);
        }
        let seats = self.db.get_seats(id).await?;
        if seats.iter().all(|s| s.finished_at().is_some()) {
            self.finalize(id).await?;
        }
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        let seat = self
            .db
            .seat_by_token(id, &Crypto::hash(token))
            .await?
            .ok_or(EngineError::Unauthorized)?;
        Ok((m, seat.rank()))
    }

    /// Finish-all: claim the `active → finished` transition, then replay
    /// the step log and write ranks. Exactly one caller wins the claim;
    /// everyone else returns without effect.
    async fn finalize(&self, id: ID<Match>) -> Result<(), EngineError> {
        if self.db.claim_finish(id, SystemTime::now()).await? == 0 {
            return Ok(());
        }
        let m = self.db.get_match(id).await?.ok_or(EngineError::NotFound)?;
        let seats = self.db.get_seats(id).await?;
        let steps = self.db.get_steps(id).await?;
        let standings = ranking::standings(&m.layout(), &seats, &steps);
        let ranks = ranking::rank(&standings);
        self.db.set_ranks(&ranks).await?;
        log::info!("[match {}] finished, ranked {} seats", id, ranks.len());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Query views
    // ------------------------------------------------------------------

    pub async fn state(&self, id: ID<Match>) -> Result<(Match, Vec<Seat>), EngineError> {
        let m = self.touched(id).await?;
        let seats = self.db.get_seats(id).await?;
        Ok((m, seats))
    }

    pub async fn steps(&self, id: ID<Match>) -> Result<Vec<Step>, EngineError> {
        self.touched(id).await?;
        self.db.get_steps(id).await.map_err(EngineError::from)
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<(Match, Vec<Seat>)>, EngineError> {
        let mut out = Vec::new();
        for m in self.db.recent_matches(limit).await? {
            // Reads touch matches, so expiry applies here too. A match
            // deleted mid-listing just drops out.
            let m = match self.touched(m.id()).await {
                Ok(m) => m,
                Err(EngineError::NotFound) => continue,
                Err(e) => return Err(e),
            };
            let seats = self.db.get_seats(m.id()).await?;
            out.push((m, seats));
        }
        Ok(out)
    }

    /// The unique in-flight seat for a user, if any.
    pub async fn active(
        &self,
        user: ID<Member>,
    ) -> Result<Option<(Match, Seat)>, EngineError> {
        let Some(id) = self.db.active_match_for(user).await? else {
            return Ok(None);
        };
        let m = self.touched(id).await?;
        if m.status() == MatchStatus::Finished {
            return Ok(None);
        }
        let seat = self
            .db
            .get_seats(id)
            .await?
            .into_iter()
            .find(|s| s.user() == user);
        Ok(seat.map(|s| (m, s)))
    }
}

fn is_unique_violation(e: &msr_database::PgErr) -> bool {
    e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION)
}
