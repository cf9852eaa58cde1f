use super::*;
use msr_core::ID;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub sid: uuid::Uuid,
    pub usr: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user: ID<Member>,
        session: ID<Session>,
        handle: String,
        ttl: std::time::Duration,
    ) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_secs() as i64;
        Self {
            sub: user.inner(),
            sid: session.inner(),
            usr: handle,
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }
    pub fn expired(&self) -> bool {
        self.exp
            < std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time")
                .as_secs() as i64
    }
    pub fn user(&self) -> ID<Member> {
        ID::from(self.sub)
    }
    pub fn session(&self) -> ID<Session> {
        ID::from(self.sid)
    }
    pub fn handle(&self) -> &str {
        &self.usr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_claims_not_expired() {
        let claims = Claims::new(
            ID::default(),
            ID::default(),
            "someone".to_string(),
            std::time::Duration::from_secs(900),
        );
        assert!(!claims.expired());
    }
    #[test]
    fn zero_ttl_expires() {
        let mut claims = Claims::new(
            ID::default(),
            ID::default(),
            "someone".to_string(),
            std::time::Duration::from_secs(0),
        );
        claims.exp -= 1;
        assert!(claims.expired());
    }
}
