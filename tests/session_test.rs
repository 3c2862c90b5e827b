use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;

use cratedig::error::ApiError;
use cratedig::session::{Session, SessionPhase, TokenExchange};
use cratedig::types::Token;

/// In-memory stand-in for the accounts service.
struct FakeExchange {
    fail_exchange: bool,
    fail_refresh: bool,
    issue_expired: bool,
    exchanges: AtomicUsize,
    refreshes: AtomicUsize,
}

impl FakeExchange {
    fn new() -> Self {
        FakeExchange {
            fail_exchange: false,
            fail_refresh: false,
            issue_expired: false,
            exchanges: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
        }
    }

    fn token(&self, access_token: &str) -> Token {
        let obtained_at = if self.issue_expired {
            // already past expiry including the refresh buffer
            Utc::now().timestamp() as u64 - 7200
        } else {
            Utc::now().timestamp() as u64
        };
        Token {
            access_token: access_token.to_string(),
            refresh_token: "refresh-token".to_string(),
            scope: "user-read-playback-state".to_string(),
            expires_in: 3600,
            obtained_at,
        }
    }
}

impl TokenExchange for FakeExchange {
    async fn exchange(&self, code: &str) -> Result<Token, ApiError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(ApiError::Auth("invalid_grant".to_string()));
        }
        Ok(self.token(&format!("access-for-{code}")))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<Token, ApiError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.fail_refresh {
            return Err(ApiError::Auth("refresh token revoked".to_string()));
        }
        let mut token = self.token("refreshed-access");
        token.obtained_at = Utc::now().timestamp() as u64;
        Ok(token)
    }
}

#[tokio::test]
async fn test_sign_in_happy_path() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    assert_eq!(session.phase(), SessionPhase::SignedOut);
    assert!(!session.is_authorized());

    session.receive_authorization_code("code-1").unwrap();
    assert_eq!(session.phase(), SessionPhase::CodeReceived);
    assert!(!session.is_authorized());

    session.exchange_token(&exchanger).await.unwrap();
    assert_eq!(session.phase(), SessionPhase::SignedIn);
    assert!(session.is_authorized());
    assert_eq!(session.access_token().unwrap(), "access-for-code-1");
    assert_eq!(exchanger.exchanges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_code_fails_and_stays_signed_out() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    assert!(matches!(
        session.receive_authorization_code(""),
        Err(ApiError::Auth(_))
    ));
    assert_eq!(session.phase(), SessionPhase::SignedOut);

    // without a captured code the exchange is invalid too
    assert!(matches!(
        session.exchange_token(&exchanger).await,
        Err(ApiError::Auth(_))
    ));
    assert_eq!(session.phase(), SessionPhase::SignedOut);
    assert_eq!(exchanger.exchanges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_exchange_is_single_use() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    session.exchange_token(&exchanger).await.unwrap();
    assert!(session.is_authorized());

    // a re-render firing the exchange again must fail cleanly, not re-run it
    assert!(matches!(
        session.exchange_token(&exchanger).await,
        Err(ApiError::Auth(_))
    ));
    assert_eq!(session.phase(), SessionPhase::SignedIn);
    assert_eq!(exchanger.exchanges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_consumed_code_stays_consumed_across_sign_out() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    session.exchange_token(&exchanger).await.unwrap();
    session.sign_out();
    assert_eq!(session.phase(), SessionPhase::SignedOut);

    assert!(matches!(
        session.receive_authorization_code("code-1"),
        Err(ApiError::Auth(_))
    ));
    assert_eq!(session.phase(), SessionPhase::SignedOut);
}

#[tokio::test]
async fn test_failed_exchange_records_reason_and_consumes_code() {
    let mut exchanger = FakeExchange::new();
    exchanger.fail_exchange = true;
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    assert!(session.exchange_token(&exchanger).await.is_err());
    assert_eq!(session.phase(), SessionPhase::SignedOut);
    assert!(session.last_error().is_some_and(|e| e.is_auth()));

    // the attempt consumed the code even though it failed
    assert!(matches!(
        session.receive_authorization_code("code-1"),
        Err(ApiError::Auth(_))
    ));
}

#[tokio::test]
async fn test_second_code_rejected_while_one_is_pending() {
    let mut session = Session::new();
    session.receive_authorization_code("code-1").unwrap();

    assert!(matches!(
        session.receive_authorization_code("code-2"),
        Err(ApiError::Auth(_))
    ));
    assert_eq!(session.phase(), SessionPhase::CodeReceived);
}

#[tokio::test]
async fn test_sign_out_clears_token_state() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    session.exchange_token(&exchanger).await.unwrap();
    session.sign_out();

    assert!(!session.is_authorized());
    assert!(matches!(session.access_token(), Err(ApiError::Auth(_))));
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_ensure_fresh_refreshes_expiring_token() {
    let mut exchanger = FakeExchange::new();
    exchanger.issue_expired = true;
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    session.exchange_token(&exchanger).await.unwrap();

    session.ensure_fresh(&exchanger).await.unwrap();
    assert!(session.is_authorized());
    assert_eq!(session.access_token().unwrap(), "refreshed-access");
    assert_eq!(exchanger.refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ensure_fresh_is_a_noop_on_fresh_tokens() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    session.exchange_token(&exchanger).await.unwrap();

    session.ensure_fresh(&exchanger).await.unwrap();
    assert_eq!(session.access_token().unwrap(), "access-for-code-1");
    assert_eq!(exchanger.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_refresh_forces_sign_out() {
    let mut exchanger = FakeExchange::new();
    exchanger.issue_expired = true;
    exchanger.fail_refresh = true;
    let mut session = Session::new();

    session.receive_authorization_code("code-1").unwrap();
    session.exchange_token(&exchanger).await.unwrap();

    assert!(session.ensure_fresh(&exchanger).await.is_err());
    assert_eq!(session.phase(), SessionPhase::SignedOut);
    assert!(session.last_error().is_some_and(|e| e.is_auth()));
}

#[tokio::test]
async fn test_ensure_fresh_requires_sign_in() {
    let exchanger = FakeExchange::new();
    let mut session = Session::new();

    assert!(matches!(
        session.ensure_fresh(&exchanger).await,
        Err(ApiError::Auth(_))
    ));
}
