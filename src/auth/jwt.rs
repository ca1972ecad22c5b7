use crate::types::{AppError, Claims, Result, Role};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Authentication service for JWT token management and password hashing.
///
/// Tokens are HS256 signed and time-bound; payloads carry only the user id
/// and role, never email or password material. The signing secret is optional
/// so the process can start without one, but every issue and verify call then
/// fails ([`AuthService::warn_if_unconfigured`] surfaces this at startup).
pub struct AuthService {
    secret: Option<String>,
    expiry_secs: i64,
}

impl AuthService {
    /// Creates a new AuthService.
    ///
    /// # Arguments
    /// * `secret` - HS256 signing secret; `None` disables token operations
    /// * `expiry_secs` - token validity in seconds
    pub fn new(secret: Option<String>, expiry_secs: i64) -> Self {
        Self {
            secret,
            expiry_secs,
        }
    }

    /// Logs a prominent error when no signing secret is configured. The
    /// process still starts; it just cannot mint or accept tokens.
    pub fn warn_if_unconfigured(&self) {
        if self.secret.is_none() {
            tracing::error!(
                "ACCESS_TOKEN_SECRET is not set: the server will start, but every \
                 login and token verification will fail until it is configured"
            );
        }
    }

    fn secret(&self) -> Result<&str> {
        self.secret
            .as_deref()
            .ok_or_else(|| AppError::Internal("signing secret is not configured".to_string()))
    }

    /// Hashes a password using Argon2id, returning a PHC-formatted string.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Verifies a password against a stored Argon2 hash.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Issues a signed token for an authenticated identity. The payload is
    /// minimal on purpose: `{id, role}` plus issued-at and expiry.
    pub fn issue_token(&self, id: i64, role: Role) -> Result<String> {
        let secret = self.secret()?;
        let now = Utc::now();
        let claims = Claims {
            id: Some(id),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and expiry and returns its claims.
    ///
    /// Any failure (bad signature, malformed token, expired, or no configured
    /// secret) collapses into the same `Forbidden` outcome the middleware
    /// responds with.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let secret = self
            .secret()
            .map_err(|_| invalid_token("signing secret is not configured"))?;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| invalid_token(&e.to_string()))
    }
}

fn invalid_token(reason: &str) -> AppError {
    tracing::debug!(reason, "token verification failed");
    AppError::Forbidden("Access denied. Invalid or expired token.".to_string())
}

/// Decodes a token payload without verifying the signature.
///
/// Client-side convenience only (route guard, display). A payload obtained
/// this way proves nothing and must never back a server-side authorization
/// decision.
pub fn decode_unverified(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}
