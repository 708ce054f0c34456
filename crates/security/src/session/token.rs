//! Signed bearer token codec.
//!
//! Wire form: `base64url(json(claims)) "." base64url(signature)`, where the
//! Ed25519 signature covers the ASCII bytes of the claims segment.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use opsgate_core::{Error, Principal, PrincipalId, Result};
use serde::{Deserialize, Serialize};

const SEGMENT_SEPARATOR: char = '.';

/// Everything a token asserts about its bearer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id
    pub sub: PrincipalId,
    /// Principal display name at issue time
    pub name: String,
    pub iss: String,
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expires at, unix seconds
    pub exp: i64,
    /// Random token id; two tokens issued in the same second never collide
    pub jti: String,
}

impl Claims {
    /// Whether the embedded expiry has passed at `now` (unix seconds)
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.name.clone())
    }
}

/// An issued token and the claims it carries.
///
/// Deliberately not `Display`: the raw string is a credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    claims: Claims,
}

impl Token {
    pub(crate) fn new(raw: String, claims: Claims) -> Self {
        Self { raw, claims }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

pub(crate) fn encode(claims: &Claims, key: &SigningKey) -> Result<String> {
    let json = serde_json::to_vec(claims)
        .map_err(|e| Error::signing(format!("cannot serialize claims: {e}")))?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = key.try_sign(payload.as_bytes()).map_err(|e| Error::signing(e.to_string()))?;
    Ok(format!(
        "{payload}{SEGMENT_SEPARATOR}{}",
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

/// Verify the signature and decode the claims. Expiry is not checked here.
pub(crate) fn decode(raw: &str, key: &VerifyingKey) -> Result<Claims> {
    let (payload, signature) = raw
        .split_once(SEGMENT_SEPARATOR)
        .ok_or_else(Error::malformed_token)?;
    if payload.is_empty() || signature.contains(SEGMENT_SEPARATOR) {
        return Err(Error::malformed_token());
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .ok()
        .and_then(|bytes| Signature::from_slice(&bytes).ok())
        .ok_or_else(Error::malformed_token)?;
    key.verify(payload.as_bytes(), &signature)
        .map_err(|_| Error::malformed_token())?;

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| Error::malformed_token())?;
    serde_json::from_slice(&json).map_err(|_| Error::malformed_token())
}
