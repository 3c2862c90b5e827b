//! Sign-in state machine and token lifecycle.
//!
//! The presentation layer is stateless across page loads, so the
//! authorization code arriving on the redirect must be captured exactly once
//! and exchanged exactly once; the remote accounts service rejects reused
//! codes. The machine tracks every code it has ever attempted and refuses
//! repeats, which keeps a re-rendered callback from silently firing a second
//! exchange.
//!
//! Phases: `SignedOut` -> `CodeReceived` -> `TokenPending` -> `SignedIn`;
//! any failure or an explicit sign-out drops back to `SignedOut`. Gateway
//! calls are only permitted from `SignedIn`. Token state lives in memory for
//! the lifetime of the session; nothing is written to disk.

use std::collections::HashSet;

use chrono::Utc;

use crate::{error::ApiError, types::Token};

/// Refresh this many seconds before the token actually expires.
const EXPIRY_BUFFER_SECS: u64 = 240;

/// External OAuth collaborator: exchanges an authorization code for a token
/// and refreshes an expiring one. The production implementation is
/// [`crate::spotify::AccountsClient`]; tests substitute an in-memory fake.
pub trait TokenExchange {
    async fn exchange(&self, code: &str) -> Result<Token, ApiError>;
    async fn refresh(&self, refresh_token: &str) -> Result<Token, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    SignedOut,
    CodeReceived,
    TokenPending,
    SignedIn,
}

/// Per-user session token state. Created at session start, destroyed at
/// session end; owned exclusively by the request handling the session.
#[derive(Debug)]
pub struct Session {
    phase: SessionPhase,
    pending_code: Option<String>,
    token: Option<Token>,
    attempted_codes: HashSet<String>,
    last_error: Option<ApiError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            phase: SessionPhase::SignedOut,
            pending_code: None,
            token: None,
            attempted_codes: HashSet::new(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// True iff the session is signed in.
    pub fn is_authorized(&self) -> bool {
        self.phase == SessionPhase::SignedIn
    }

    /// The failure that caused the most recent drop to `SignedOut`, if any.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// The access token for gateway requests.
    ///
    /// Fails with [`ApiError::Auth`] unless the session is signed in, which
    /// is what makes `SignedIn` the only phase gateway calls can start from.
    pub fn access_token(&self) -> Result<&str, ApiError> {
        match (&self.phase, &self.token) {
            (SessionPhase::SignedIn, Some(token)) => Ok(&token.access_token),
            _ => Err(ApiError::Auth("not signed in".to_string())),
        }
    }

    /// Captures the authorization code from the OAuth redirect.
    ///
    /// Valid only in `SignedOut`. An empty code and a code that was already
    /// attempted (even before an intervening sign-out) are both rejected with
    /// [`ApiError::Auth`], leaving the phase unchanged.
    pub fn receive_authorization_code(&mut self, code: &str) -> Result<(), ApiError> {
        if self.phase != SessionPhase::SignedOut {
            return Err(ApiError::Auth(
                "a sign-in is already in progress or completed".to_string(),
            ));
        }
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::Auth("empty authorization code".to_string()));
        }
        if self.attempted_codes.contains(code) {
            return Err(ApiError::Auth(
                "authorization code was already used".to_string(),
            ));
        }

        self.pending_code = Some(code.to_string());
        self.phase = SessionPhase::CodeReceived;
        Ok(())
    }

    /// Exchanges the captured code for a token via the external collaborator.
    ///
    /// Valid only in `CodeReceived`. The code is marked as attempted and the
    /// phase moves to `TokenPending` *before* the remote call, so a re-render
    /// that triggers a second call with the same code fails cleanly instead
    /// of double-exchanging. Success lands in `SignedIn`; failure drops to
    /// `SignedOut` with the classified reason recorded. Calling this from any
    /// other phase is an [`ApiError::Auth`] and leaves the phase as it was.
    pub async fn exchange_token(
        &mut self,
        exchanger: &impl TokenExchange,
    ) -> Result<(), ApiError> {
        if self.phase != SessionPhase::CodeReceived {
            return Err(ApiError::Auth(
                "no authorization code awaiting exchange".to_string(),
            ));
        }
        let code = self
            .pending_code
            .take()
            .ok_or_else(|| ApiError::Auth("no authorization code awaiting exchange".to_string()))?;

        self.attempted_codes.insert(code.clone());
        self.phase = SessionPhase::TokenPending;

        match exchanger.exchange(&code).await {
            Ok(token) => {
                self.token = Some(token);
                self.phase = SessionPhase::SignedIn;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.token = None;
                self.phase = SessionPhase::SignedOut;
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Refreshes the access token if it is within the expiry buffer.
    ///
    /// No-op while the token is still fresh. A refresh failure invalidates
    /// the sign-in: the session drops to `SignedOut` and the caller has to
    /// send the user back through the authorization redirect.
    pub async fn ensure_fresh(&mut self, exchanger: &impl TokenExchange) -> Result<(), ApiError> {
        if self.phase != SessionPhase::SignedIn {
            return Err(ApiError::Auth("not signed in".to_string()));
        }
        if !self.is_expired() {
            return Ok(());
        }

        let refresh_token = self
            .token
            .as_ref()
            .map(|t| t.refresh_token.clone())
            .unwrap_or_default();

        match exchanger.refresh(&refresh_token).await {
            Ok(mut new_token) => {
                // The accounts service may omit a rotated refresh token.
                if new_token.refresh_token.is_empty() {
                    new_token.refresh_token = refresh_token;
                }
                self.token = Some(new_token);
                Ok(())
            }
            Err(e) => {
                self.sign_out();
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Clears the token state and returns to `SignedOut`. Valid from any
    /// phase. Attempted codes stay attempted; consumed codes remain consumed.
    pub fn sign_out(&mut self) {
        self.phase = SessionPhase::SignedOut;
        self.pending_code = None;
        self.token = None;
        self.last_error = None;
    }

    fn is_expired(&self) -> bool {
        match &self.token {
            Some(token) => {
                let now = Utc::now().timestamp() as u64;
                now + EXPIRY_BUFFER_SECS >= token.obtained_at + token.expires_in
            }
            None => true,
        }
    }
}
