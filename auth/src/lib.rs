//! Credential and session-token primitives
//!
//! Store-agnostic building blocks shared by the principal services:
//! - Secret hashing (Argon2id)
//! - Signed, time-bounded session tokens (HS256 compact JWS)
//! - Authentication coordination
//!
//! Looking principals up is left to the caller; this crate only ever sees
//! a plaintext secret, a stored hash and a subject.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::{Duration, Utc};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let now = Utc::now();
//! let token = codec.issue("a@b.com", now, Duration::hours(1)).unwrap();
//! assert_eq!(codec.decode(&token, now).unwrap(), "a@b.com");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::{Duration, Utc};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(1));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let now = Utc::now();
//! let result = auth.authenticate("password123", &hash, "a@b.com", now).unwrap();
//!
//! // Validate token
//! let subject = auth.validate_token(&result.access_token, now).unwrap();
//! assert_eq!(subject, "a@b.com");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
