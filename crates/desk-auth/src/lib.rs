//! # desk-auth
//!
//! Credential primitives for Shopdesk.
//!
//! Passwords are hashed with argon2id (`argon2`), and sessions are stateless
//! HS256 JWTs (`jsonwebtoken`) carrying the user id, email, name, and role.
//! Permission checks live in `desk-core`; this crate only proves who the
//! caller is.

pub mod claims;
pub mod error;
pub mod password;
pub mod token;

pub use claims::Claims;
pub use error::AuthError;
pub use password::{hash_password, verify_decoy, verify_password};
pub use token::TokenIssuer;
