//! Session authority: issues, validates and revokes bearer tokens.
//!
//! A token is only valid while it is the exact string recorded for its
//! principal in the [`CredentialStore`]. Issuing a new token overwrites that
//! record, so every principal has at most one live session.

mod token;


pub use token::{Claims, Token};

use chrono::Utc;
use ed25519_dalek::{SigningKey, VerifyingKey};
use opsgate_cache::CredentialStore;
use opsgate_core::{Error, PrincipalId, Result, MAX_SESSION_TTL, SESSION_TTL};
use rand::rngs::OsRng;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use zeroize::Zeroizing;

pub const DEFAULT_ISSUER: &str = "opsgate";

pub struct SessionAuthority {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    issuer: String,
    validity: Duration,
    credentials: CredentialStore,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("issuer", &self.issuer)
            .field("validity", &self.validity)
            .field("public_key", &hex::encode(self.verifying_key.to_bytes()))
            .finish_non_exhaustive()
    }
}

impl SessionAuthority {
    /// Create an authority from an existing signing key
    pub fn from_signing_key(signing_key: SigningKey, credentials: CredentialStore) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
            issuer: DEFAULT_ISSUER.to_string(),
            validity: SESSION_TTL,
            credentials,
        }
    }

    /// Create an authority with a freshly generated key.
    ///
    /// Tokens do not survive a restart of a process that uses this.
    pub fn generate(credentials: CredentialStore) -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng), credentials)
    }

    /// Create an authority from a hex-encoded 32-byte Ed25519 seed
    pub fn from_seed_hex(seed_hex: &str, credentials: CredentialStore) -> Result<Self> {
        Ok(Self::from_signing_key(signing_key_from_hex(seed_hex)?, credentials))
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Token lifetime, capped at [`MAX_SESSION_TTL`]
    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity.min(MAX_SESSION_TTL);
        self
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Sign a token for the principal and record it as the only current one.
    ///
    /// The token is not returned unless the credential record was written.
    pub async fn issue_token(&self, principal: PrincipalId, name: &str) -> Result<Token> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: principal,
            name: name.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.validity.as_secs()).unwrap_or(i64::MAX)),
            jti: generate_token_id()?,
        };
        let raw = self.sign_claims(&claims)?;

        self.credentials.put(principal, &raw, self.validity).await?;
        info!(principal = %principal, jti = %claims.jti, "session issued");
        Ok(Token::new(raw, claims))
    }

    /// Check signature, expiry and that the token is the principal's current one
    pub async fn validate_token(&self, raw: &str) -> Result<Claims> {
        let claims = self.inspect_token(raw)?;

        let current = self.credentials.current(claims.sub).await?;
        match current {
            None => {
                debug!(principal = %claims.sub, "no live session record");
                Err(Error::expired())
            }
            Some(current) if bool::from(current.as_bytes().ct_eq(raw.as_bytes())) => Ok(claims),
            Some(_) => {
                debug!(
                    principal = %claims.sub,
                    jti = %claims.jti,
                    "token superseded by a newer login"
                );
                Err(Error::superseded_session())
            }
        }
    }

    /// Check signature and embedded expiry only, without consulting the store
    pub fn inspect_token(&self, raw: &str) -> Result<Claims> {
        let claims = token::decode(raw, &self.verifying_key)?;
        if claims.iss != self.issuer {
            return Err(Error::malformed_token());
        }
        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(Error::expired());
        }
        Ok(claims)
    }

    /// Drop the principal's session record. Revoking twice is not an error.
    pub async fn revoke_token(&self, principal: PrincipalId) -> Result<()> {
        let existed = self.credentials.remove(principal).await?;
        info!(principal = %principal, existed, "session revoked");
        Ok(())
    }

    pub(crate) fn sign_claims(&self, claims: &Claims) -> Result<String> {
        token::encode(claims, &self.signing_key)
    }
}

/// Parse a hex-encoded 32-byte Ed25519 seed
pub fn signing_key_from_hex(seed_hex: &str) -> Result<SigningKey> {
    let bytes = Zeroizing::new(
        hex::decode(seed_hex.trim())
            .map_err(|e| Error::configuration(format!("signing key is not valid hex: {e}")))?,
    );
    let seed: &[u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        Error::configuration(format!(
            "signing key must be 32 bytes (64 hex chars), got {} bytes",
            bytes.len()
        ))
    })?;
    Ok(SigningKey::from_bytes(seed))
}

/// Fresh random signing seed, hex encoded
pub fn generate_seed_hex() -> Zeroizing<String> {
    Zeroizing::new(hex::encode(SigningKey::generate(&mut OsRng).to_bytes()))
}

/// Random 128-bit token id, hex encoded
fn generate_token_id() -> Result<String> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| Error::signing(format!("cannot generate token id: {e}")))?;
    Ok(hex::encode(bytes))
}
