use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::AuthError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Salted bcrypt hash at the given cost.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(plaintext, cost).map_err(|e| AuthError::Crypto(format!("bcrypt hash: {e}")))
}

/// Compare a plaintext password against a stored bcrypt hash.
///
/// A malformed hash never matches.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    match bcrypt::verify(plaintext, hash) {
        Ok(matched) => matched,
        Err(e) => {
            warn!("Rejecting password check against unusable hash: {}", e);
            false
        }
    }
}

/// 32 random bytes, base64url without padding. Handed out once; only the
/// digest is stored.
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a raw invite token, hex-encoded.
pub fn hash_invite_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}
