//! Credential service: password hashing, signed session tokens and invite
//! secrets. The signing key is injected at construction; nothing here
//! reads the environment.

pub mod context;
pub mod password;
pub mod token;

use thiserror::Error;

pub use context::{PlatformContext, TenantContext};
pub use password::{generate_invite_token, hash_invite_token, MIN_PASSWORD_LENGTH};
pub use token::{
    CredentialService, IssuedToken, PlatformClaims, SessionKind, TenantClaims, PLATFORM_AUDIENCE,
    TENANT_AUDIENCE,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}
