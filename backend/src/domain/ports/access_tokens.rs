//! Port for issuing and verifying bearer access tokens.

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by access token adapters.
    pub enum AccessTokenError {
        /// Token is malformed, has a bad signature or carries invalid claims.
        Invalid { message: String } => "access token rejected: {message}",
        /// Token signature is valid but it has expired.
        Expired => "access token expired",
        /// Token could not be produced.
        Issue { message: String } => "access token could not be issued: {message}",
    }
}

/// Signs and checks bearer tokens identifying a user.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenService: Send + Sync {
    /// Issue a token for `user_id`.
    fn issue(&self, user_id: UserId) -> Result<AccessToken, AccessTokenError>;

    /// Verify `token` and return the user it identifies.
    fn verify(&self, token: &str) -> Result<UserId, AccessTokenError>;
}
