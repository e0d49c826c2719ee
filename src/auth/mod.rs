use std::fmt;

pub mod callback;
pub mod spotify_auth;

#[derive(Debug)]
pub struct AuthError;

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Authentication error")
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = error_stack::Result<T, AuthError>;

/// Access token for the Spotify Web API, valid for the rest of the run.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}
