//! Token Service: HS256 compact tokens carrying `{sub, iat, exp}`.

pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::Claims;
pub use errors::JwtError;
pub use handler::JwtHandler;
