//! Cryptography module for account credentials
//!
//! Passwords are stored as Argon2id PHC strings. Access tokens are
//! `base64url(claims).base64url(HMAC-SHA256(secret, claims))`, signed
//! with the server's shared secret.

use crate::error::{AppError, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User identifier
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Generic(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Generic(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Issue a signed token for `user_id`, valid for `ttl_hours`
pub fn issue_token(user_id: &str, secret: &[u8], ttl_hours: i64) -> Result<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    sign_claims(&claims, secret)
}

/// Verify a token and return its claims.
///
/// Every failure (bad shape, bad signature, expiry) is `Unauthenticated`.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Unauthenticated)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthenticated)?;

    let mut mac = new_mac(secret)?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AppError::Unauthenticated)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::Unauthenticated)?;
    let claims: TokenClaims =
        serde_json::from_slice(&payload).map_err(|_| AppError::Unauthenticated)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(AppError::Unauthenticated);
    }

    Ok(claims)
}

fn sign_claims(claims: &TokenClaims, secret: &[u8]) -> Result<String> {
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);

    let mut mac = new_mac(secret)?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

fn new_mac(secret: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Generic(format!("Token key initialization failed: {}", e)))
}
