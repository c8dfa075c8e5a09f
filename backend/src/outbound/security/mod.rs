//! Credential adapters: bcrypt password hashing and HS256 access tokens.

mod bcrypt_password_hasher;
mod jwt_access_tokens;

pub use bcrypt_password_hasher::BcryptPasswordHasher;
pub use jwt_access_tokens::{DEFAULT_TOKEN_TTL_HOURS, JwtAccessTokens};
