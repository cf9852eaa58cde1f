//! Authentication, sessions, and identity management.
//!
//! JWT-based authentication with Argon2 password hashing. The rest of the
//! workspace treats this crate as an opaque authenticator: it maps a bearer
//! token to a stable `(id, handle)` identity and nothing else.
//!
//! ## Identity Types
//!
//! - [`Member`] — Registered user with credentials
//! - [`Session`] — Active login session with expiry
//!
//! ## Security
//!
//! - [`Crypto`] — JWT signing and verification
//! - [`Claims`] — JWT payload structure
//! - [`password`] — Argon2 hashing and verification
mod claims;
mod crypto;
mod dto;
mod handlers;
mod member;
mod middleware;
pub mod password;
mod repository;
mod session;

pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use handlers::*;
pub use member::*;
pub use middleware::*;
pub use repository::*;
pub use session::*;
