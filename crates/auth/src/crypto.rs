use super::*;

const DEFAULT_TOKEN_MINUTES: u64 = 15;

pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    ttl: std::time::Duration,
}

impl Crypto {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
            ttl,
        }
    }
    pub fn from_env() -> Self {
        let minutes = std::env::var("JWT_EXPIRES_MINUTES")
            .ok()
            .and_then(|m| m.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_MINUTES);
        Self::new(
            std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| String::default())
                .as_bytes(),
            std::time::Duration::from_secs(minutes * 60),
        )
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), claims, &self.encoding)
    }
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &jsonwebtoken::Validation::default())
            .map(|data| data.claims)
    }
    pub fn hash(token: &str) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(token.as_bytes()).to_vec()
    }
    pub fn duration(&self) -> std::time::Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msr_core::ID;

    #[test]
    fn encode_decode_round_trip() {
        let crypto = Crypto::new(b"test-secret", std::time::Duration::from_secs(900));
        let claims = Claims::new(
            ID::default(),
            ID::default(),
            "someone".to_string(),
            crypto.duration(),
        );
        let token = crypto.encode(&claims).expect("encode");
        let decoded = crypto.decode(&token).expect("decode");
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.sid, claims.sid);
        assert_eq!(decoded.usr, claims.usr);
    }
    #[test]
    fn wrong_secret_rejected() {
        let signer = Crypto::new(b"secret-a", std::time::Duration::from_secs(900));
        let other = Crypto::new(b"secret-b", std::time::Duration::from_secs(900));
        let claims = Claims::new(
            ID::default(),
            ID::default(),
            "someone".to_string(),
            signer.duration(),
        );
        let token = signer.encode(&claims).expect("encode");
        assert!(other.decode(&token).is_err());
    }
    #[test]
    fn hash_is_stable() {
        assert_eq!(Crypto::hash("token"), Crypto::hash("token"));
        assert_ne!(Crypto::hash("token"), Crypto::hash("other"));
    }
}
