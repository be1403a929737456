use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::password;
use super::AuthError;
use crate::config::{JwtSecret, SecurityConfig};
use crate::database::models::{Role, SuperAdmin, User};

/// Audience of tokens held by tenant users (including impersonated sessions).
pub const TENANT_AUDIENCE: &str = "tenant";
/// Audience of tokens held by super admins.
pub const PLATFORM_AUDIENCE: &str = "platform";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Standard,
    Impersonation,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Standard => "standard",
            SessionKind::Impersonation => "impersonation",
        }
    }
}

/// Claims of a tenant session. `tenant_id` is the only tenant identity the
/// server trusts for scoping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantClaims {
    /// User id.
    pub sub: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub session: SessionKind,
    /// Super admin acting through an impersonation session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Uuid>,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

/// Claims of a super-admin session. Carries no tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformClaims {
    /// Super admin id.
    pub sub: Uuid,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Hashes passwords and signs/verifies HS256 session tokens with the
/// process-wide secret it was built with.
#[derive(Clone)]
pub struct CredentialService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl CredentialService {
    pub fn new(secret: &JwtSecret, token_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            bcrypt_cost,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.jwt_secret,
            Duration::hours(security.jwt_expiry_hours as i64),
            security.bcrypt_cost,
        )
    }

    pub fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        password::hash_password(plaintext, self.bcrypt_cost)
    }

    pub fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        password::verify_password(plaintext, hash)
    }

    pub fn issue_tenant_token(&self, user: &User) -> Result<IssuedToken, AuthError> {
        self.issue_tenant(user, SessionKind::Standard, None, self.token_ttl)
    }

    /// Time-boxed session acting as `user`, attributed to the super admin `actor`.
    pub fn issue_impersonation_token(
        &self,
        user: &User,
        actor: Uuid,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        self.issue_tenant(user, SessionKind::Impersonation, Some(actor), ttl)
    }

    fn issue_tenant(
        &self,
        user: &User,
        session: SessionKind,
        actor: Option<Uuid>,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = TenantClaims {
            sub: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
            session,
            actor,
            aud: TENANT_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };
        Ok(IssuedToken { token: self.sign(&claims)?, expires_at })
    }

    pub fn issue_platform_token(&self, admin: &SuperAdmin) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;
        let claims = PlatformClaims {
            sub: admin.id,
            aud: PLATFORM_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };
        Ok(IssuedToken { token: self.sign(&claims)?, expires_at })
    }

    pub fn verify_tenant_token(&self, token: &str) -> Result<TenantClaims, AuthError> {
        self.verify(token, TENANT_AUDIENCE)
    }

    pub fn verify_platform_token(&self, token: &str) -> Result<PlatformClaims, AuthError> {
        self.verify(token, PLATFORM_AUDIENCE)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    fn verify<T: DeserializeOwned>(&self, token: &str, audience: &str) -> Result<T, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);
        validation.leeway = 0;

        jsonwebtoken::decode::<T>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}
