//! Username/password login

use opsgate_core::{AuthFailure, Error, PrincipalDirectory, Result};
use std::sync::Arc;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::password::verify_password;
use crate::session::{SessionAuthority, Token};

/// Checks credentials against the principal directory and opens a session
pub struct Authenticator {
    directory: Arc<dyn PrincipalDirectory>,
    sessions: Arc<SessionAuthority>,
    password_salt: Zeroizing<String>,
}

impl Authenticator {
    pub fn new(
        directory: Arc<dyn PrincipalDirectory>,
        sessions: Arc<SessionAuthority>,
        password_salt: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            sessions,
            password_salt: Zeroizing::new(password_salt.into()),
        }
    }

    /// Log in, replacing any session the principal already had.
    ///
    /// An unknown user and a wrong password fail identically. A disabled
    /// account is reported as such.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Token> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::validation("username", "must not be empty"));
        }
        if password.is_empty() {
            return Err(Error::validation("password", "must not be empty"));
        }

        let Some(user) = self.directory.find_by_username(username).await? else {
            warn!(username = %username, "login for unknown user");
            return Err(Error::auth(AuthFailure::InvalidCredentials));
        };
        if !user.enabled {
            warn!(principal = %user.id, "login for disabled account");
            return Err(Error::auth(AuthFailure::AccountDisabled));
        }
        if !self.check_password(password, &user.password_hash).await? {
            warn!(principal = %user.id, "login with wrong password");
            return Err(Error::auth(AuthFailure::InvalidCredentials));
        }

        let token = self.sessions.issue_token(user.id, &user.username).await?;
        info!(principal = %user.id, username = %user.username, "login succeeded");
        Ok(token)
    }

    // bcrypt is CPU bound, keep it off the async workers
    async fn check_password(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let salt = self.password_salt.clone();
        let password = Zeroizing::new(password.to_string());
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&salt, &password, &stored_hash))
            .await
            .map_err(|e| Error::configuration(format!("password check aborted: {e}")))
    }
}
