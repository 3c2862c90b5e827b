//! OAuth accounts client: authorization URL, code exchange, token refresh.
//!
//! Implements the confidential-client authorization-code flow. The browser is
//! sent to the accounts service with a random `state` token; the service
//! redirects back to `/callback` with a single-use authorization code, which
//! [`AccountsClient`] exchanges for an access token using HTTP Basic
//! authentication (client id and secret). The same client refreshes tokens
//! nearing expiry. State-machine bookkeeping (who may exchange what, and when)
//! lives in [`crate::session`]; this module only talks to the wire.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{config, error::ApiError, session::TokenExchange, types::Token};

const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the accounts endpoints (authorize, token).
pub struct AccountsClient {
    client: Client,
}

impl AccountsClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(TOKEN_REQUEST_TIMEOUT).build()?;
        Ok(AccountsClient { client })
    }

    /// Builds the authorization URL the login page links to.
    ///
    /// `state` is echoed back on the redirect and must be compared against
    /// the value issued with the link before the code is accepted.
    pub fn authorize_url(state: &str) -> String {
        format!(
            "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&scope={scope}&state={state}",
            auth_url = &config::spotify_apiauth_url(),
            client_id = urlencoding::encode(&config::spotify_client_id()),
            redirect_uri = urlencoding::encode(&config::spotify_redirect_uri()),
            scope = urlencoding::encode(&config::spotify_scope()),
            state = state,
        )
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<Token, ApiError> {
        let credentials = STANDARD.encode(format!(
            "{}:{}",
            config::spotify_client_id(),
            config::spotify_client_secret()
        ));

        let res = self
            .client
            .post(config::spotify_apitoken_url())
            .header("Authorization", format!("Basic {credentials}"))
            .form(form)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = res.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            // invalid_grant, reused code, revoked refresh token
            let body: Value = res.json().await.unwrap_or(Value::Null);
            let description = body["error_description"]
                .as_str()
                .or_else(|| body["error"].as_str())
                .unwrap_or("authorization code or credentials rejected")
                .to_string();
            return Err(ApiError::Auth(description));
        }
        if !status.is_success() {
            return Err(ApiError::Service(format!(
                "token endpoint answered with status {status}"
            )));
        }

        let json: Value = res.json().await.map_err(ApiError::from)?;
        let access_token = json["access_token"].as_str().unwrap_or_default().to_string();
        if access_token.is_empty() {
            return Err(ApiError::Service(
                "token response carried no access token".to_string(),
            ));
        }

        Ok(Token {
            access_token,
            refresh_token: json["refresh_token"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}

impl TokenExchange for AccountsClient {
    /// Exchanges an authorization code for an access token.
    ///
    /// Codes are single-use and short-lived; the accounts service rejects a
    /// repeat with `invalid_grant`, which classifies as [`ApiError::Auth`].
    async fn exchange(&self, code: &str) -> Result<Token, ApiError> {
        let redirect_uri = config::spotify_redirect_uri();
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &redirect_uri),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Token, ApiError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }
}

/// Random token for the OAuth `state` parameter and for session cookies.
pub fn generate_state_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
