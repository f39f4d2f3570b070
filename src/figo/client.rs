//! HTTP client for the figo REST API.

use crate::error::FigoError;
use crate::figo::models::{AccessToken, Account, ApiError, Transaction};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Read operations against the aggregation API.
///
/// The refresh loop depends on this trait rather than the concrete client so
/// its state machine can be exercised against scripted responses.
#[async_trait]
pub trait BankApi: Send + Sync {
    async fn fetch_accounts(&self, token: &AccessToken) -> Result<Vec<Account>, FigoError>;
    async fn fetch_transactions(&self, token: &AccessToken)
    -> Result<Vec<Transaction>, FigoError>;
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: Vec<Transaction>,
}

/// Authenticated client for one upstream API endpoint.
///
/// Cheap to clone; the underlying connection pool is shared. Redirects are
/// never followed because the login-URL probe reads the `Location` header as
/// its payload.
#[derive(Clone)]
pub struct FigoClient {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
}

impl FigoClient {
    pub fn new(base_url: &str, client_id: &str, client_secret: &str) -> Result<Self, FigoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &AccessToken,
    ) -> Result<T, FigoError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        decode_body(status, &body)
    }
}

/// Classify a response by status before decoding the payload.
///
/// 401 never decodes the body: it is the reauthentication signal. Any other
/// status >= 400 carries a structured error object.
pub(crate) fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, FigoError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(FigoError::Unauthorized);
    }
    if status.as_u16() >= 400 {
        let api_err: ApiError = serde_json::from_slice(body)?;
        return Err(FigoError::Api(api_err));
    }
    Ok(serde_json::from_slice(body)?)
}

#[async_trait]
impl BankApi for FigoClient {
    async fn fetch_accounts(&self, token: &AccessToken) -> Result<Vec<Account>, FigoError> {
        let response: AccountsResponse = self.get_json("/rest/accounts", token).await?;
        Ok(response.accounts)
    }

    async fn fetch_transactions(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<Transaction>, FigoError> {
        let response: TransactionsResponse = self.get_json("/rest/transactions", token).await?;
        Ok(response.transactions)
    }
}
