//! Token acquisition flows: password grant, interactive login URL, and
//! authorization-code exchange.
//!
//! All flows POST to `/auth/token` with HTTP basic auth carrying the OAuth
//! client id and secret; only the grant type differs.

use crate::error::FigoError;
use crate::figo::client::FigoClient;
use crate::figo::models::{AccessToken, ApiError, TokenPair};
use async_trait::async_trait;
use serde::Deserialize;

/// Exchanges long-lived credentials for a short-lived access token.
///
/// Abstracted so the refresh loop's reauthentication path is testable without
/// a live endpoint.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        scope: &str,
    ) -> Result<AccessToken, FigoError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn login_url_query<'a>(
    client_id: &'a str,
    scope: &'a str,
    state: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        ("client_id", client_id),
        ("response_type", "code"),
        ("scope", scope),
        ("state", state),
    ]
}

fn password_grant_params<'a>(
    username: &'a str,
    password: &'a str,
    scope: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        ("grant_type", "password"),
        ("username", username),
        ("password", password),
        ("scope", scope),
    ]
}

fn code_exchange_params(code: &str) -> [(&'static str, &str); 2] {
    [("grant_type", "authorization_code"), ("code", code)]
}

/// Classify a token-endpoint response by status.
///
/// Credential rejection is its own failure class: the refresh loop escalates
/// it as fatal instead of counting it as a scrape error.
fn check_token_status(status: reqwest::StatusCode, body: &[u8]) -> Result<(), FigoError> {
    if status.is_success() {
        return Ok(());
    }
    let reason = serde_json::from_slice::<ApiError>(body)
        .map(|err| err.to_string())
        .unwrap_or_else(|_| format!("HTTP {status}"));
    Err(FigoError::Auth { reason })
}

impl FigoClient {
    async fn token_request(&self, params: &[(&str, &str)]) -> Result<Vec<u8>, FigoError> {
        let form_body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();

        let response = self
            .client
            .post(self.url("/auth/token"))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        check_token_status(status, &body)?;

        Ok(body.to_vec())
    }

    /// Password-grant authentication for the background polling mode.
    pub async fn password_grant(
        &self,
        username: &str,
        password: &str,
        scope: &str,
    ) -> Result<AccessToken, FigoError> {
        let body = self
            .token_request(&password_grant_params(username, password, scope))
            .await?;
        let response: TokenResponse = serde_json::from_slice(&body)?;
        Ok(AccessToken::new(response.access_token))
    }

    /// Resolve the interactive login URL for the manual authorization flow.
    ///
    /// The endpoint answers with a redirect to the hosted login page; since
    /// the client never follows redirects, the `Location` header is returned
    /// verbatim for the operator to open in a browser.
    pub async fn obtain_login_url(&self, scope: &str, state: &str) -> Result<String, FigoError> {
        let response = self
            .client
            .get(self.url("/auth/code"))
            .query(&login_url_query(&self.client_id, scope, state))
            .send()
            .await?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        location.ok_or_else(|| FigoError::Auth {
            reason: "login redirect carried no Location header".to_string(),
        })
    }

    /// Exchange an authorization code from the callback URL for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, FigoError> {
        let body = self.token_request(&code_exchange_params(code)).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Authenticator for FigoClient {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        scope: &str,
    ) -> Result<AccessToken, FigoError> {
        self.password_grant(username, password, scope).await
    }
}
