//! Bearer-credential verification for the tool routes.
//!
//! The verifier makes a pure accept/reject decision against the
//! process-wide signing secret; it runs to completion before any registry
//! lookup or dispatch work, and a rejection short-circuits the request with
//! zero backend contact.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Why a presented credential was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("Missing Authorization header")]
    MissingCredential,

    /// Header present but not shaped like `<scheme> <token>`.
    #[error("Malformed Authorization header")]
    MalformedCredential,

    /// Signature mismatch or expired token.
    #[error("Invalid token")]
    InvalidCredential,
}

/// Verified claim set extracted from a caller's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject id, propagated to backends in the identity header.
    pub subject: String,
    /// Caller role as claimed in the token.
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    id: String,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    "agent".to_string()
}

/// Validates bearer tokens against the process-wide signing secret.
///
/// Built once at startup; read-only afterwards and shared across request
/// tasks without synchronization.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced when the claim is present, but tokens minted
        // without `exp` are still accepted.
        validation.required_spec_claims.clear();
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify the raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredential`] if the header is absent or empty.
    /// - [`AuthError::MalformedCredential`] if it lacks a token segment.
    /// - [`AuthError::InvalidCredential`] on signature mismatch or expiry.
    pub fn verify(&self, raw_header: Option<&str>) -> Result<Identity, AuthError> {
        let header = raw_header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let (_scheme, token) = header
            .split_once(' ')
            .ok_or(AuthError::MalformedCredential)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MalformedCredential);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|_| AuthError::InvalidCredential)?;

        Ok(Identity {
            subject: data.claims.id,
            role: data.claims.role,
        })
    }
}
