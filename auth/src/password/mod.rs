//! Password Hasher: Argon2id with per-hash random salts.

pub mod argon2;
pub mod errors;

pub use argon2::PasswordHasher;
pub use errors::PasswordError;
