//! # Staff Tokens
//!
//! Stateless bearer tokens in compact JWS form:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(secret, header "." claims))
//! ```
//!
//! The header is always `{"alg":"HS256","typ":"JWT"}`. Segments use the
//! URL-safe alphabet without padding. Nothing about issued tokens is kept
//! server-side; a token stays valid until `exp` passes.

use crate::primitives::TOKEN_ALGORITHM;
use crate::{Identity, MergingtonError};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a presented token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not three base64url segments, or a segment is not the expected JSON.
    #[error("malformed token")]
    Malformed,

    /// The header names an algorithm other than HS256.
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    /// The signature does not match the header and claims.
    #[error("invalid signature")]
    InvalidSignature,

    /// The token was valid but `exp` has passed.
    #[error("token expired")]
    Expired,
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Staff email.
    pub sub: String,
    pub name: String,
    pub role: String,
    /// Issued-at, Unix seconds.
    #[serde(default)]
    pub iat: u64,
    /// Expiry, Unix seconds. The token is valid while `now <= exp`.
    pub exp: u64,
}

impl Claims {
    /// Claims for `identity`, valid for `ttl_secs` from `now`.
    #[must_use]
    pub fn new(identity: &Identity, now: u64, ttl_secs: u64) -> Self {
        Self {
            sub: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role.clone(),
            iat: now,
            exp: now.saturating_add(ttl_secs),
        }
    }

    /// The identity carried by these claims.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            email: self.sub.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

/// HS256 signer and verifier over one symmetric secret.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a signer. The secret must be non-empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, MergingtonError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(MergingtonError::Config(
                "Token secret must not be empty".to_string(),
            ));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| MergingtonError::Config(format!("Token secret: {}", e)))?;
        Ok(Self { mac })
    }

    /// Encode and sign `claims`.
    pub fn sign(&self, claims: &Claims) -> Result<String, MergingtonError> {
        let header = Header {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| MergingtonError::Serialization(e.to_string()))?;
        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| MergingtonError::Serialization(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = self.signature(signing_input.as_bytes());

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Decode `token` and check its header, signature, and expiry at `now`.
    ///
    /// The signature is checked before the expiry, so an expired token is
    /// only reported as [`TokenError::Expired`] if it was genuinely issued
    /// with this secret.
    pub fn verify(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        // Slice the signing input out of the original token rather than
        // re-encoding, so the exact bytes that were signed are checked.
        let signing_input_len = header_b64.len() + 1 + claims_b64.len();
        let mut mac = self.mac.clone();
        mac.update(&token.as_bytes()[..signing_input_len]);
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims = decode_segment(claims_b64)?;
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        if now > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn signature(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

// =============================================================================
// TESTS
// =============================================================================
