use chrono::{DateTime, Utc};
use eyre::{eyre, WrapErr};
use opsgate_cache::{CredentialStore, MemoryStore};
use opsgate_config::Config;
use opsgate_security::SessionAuthority;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

/// Signature and expiry only; the session store is not consulted
pub fn execute(config: &Config, token: &str, out: &mut impl Write) -> eyre::Result<()> {
    let seed = config
        .security
        .signing_key
        .as_deref()
        .ok_or_else(|| eyre!("security.signing_key is required to inspect tokens"))?;
    let authority = SessionAuthority::from_seed_hex(
        seed,
        CredentialStore::new(Arc::new(MemoryStore::new())),
    )?
    .with_issuer(config.security.issuer.clone());

    let claims = authority
        .inspect_token(token.trim())
        .wrap_err("token rejected")?;
    let rendered = json!({
        "claims": claims,
        "issued_at": DateTime::<Utc>::from_timestamp(claims.iat, 0).map(|t| t.to_rfc3339()),
        "expires_at": DateTime::<Utc>::from_timestamp(claims.exp, 0).map(|t| t.to_rfc3339()),
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&rendered)?)?;
    Ok(())
}
