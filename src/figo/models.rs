//! Wire types for the figo REST API.
//!
//! All structs are plain snapshots of the JSON the API returns; they carry no
//! behavior beyond deserialization. Fields the upstream may omit default to
//! their zero value so a sparse record never fails the whole fetch.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Opaque bearer token for authenticated API calls.
///
/// Held only in memory by the refresh loop and replaced wholesale whenever
/// reauthentication runs.
#[derive(Debug, Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Token pair returned by the authorization-code exchange.
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// Sync state of an account or balance as reported upstream.
///
/// Code 1 means healthy; any other code identifies a specific error state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyncStatus {
    pub code: i64,
    pub message: String,
    pub sync_timestamp: Option<DateTime<Utc>>,
    pub success_timestamp: Option<DateTime<Utc>>,
}

impl SyncStatus {
    pub fn is_healthy(&self) -> bool {
        self.code == 1
    }
}

/// Current balance of an account, absent while the first sync is pending.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub balance: f64,
    pub balance_date: Option<DateTime<Utc>>,
    pub credit_line: f64,
    #[serde(alias = "monthy_spending_limit")]
    pub monthly_spending_limit: f64,
    pub status: SyncStatus,
}

/// A bank account known to the aggregation service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    pub account_id: String,
    pub bank_id: String,
    pub name: String,
    pub owner: String,
    pub account_number: String,
    pub bank_code: String,
    pub bank_name: String,
    pub currency: String,
    pub iban: String,
    pub bic: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub sync_enabled: bool,
    pub in_total_balance: bool,
    pub save_pin: bool,
    pub status: SyncStatus,
    pub balance: Option<Balance>,
}

/// A single booked or pending transaction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub account_id: String,
    pub transaction_id: String,
    pub purpose: String,
    pub booking_date: Option<DateTime<Utc>>,
    pub name: String,
    pub amount: f64,
    pub currency: String,
    pub account_number: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub booking_text: String,
    pub bank_code: String,
    pub bank_name: String,
}

/// Structured error body returned on non-2xx responses (except 401).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub status: i64,
    pub error: ApiErrorDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorDetails {
    pub code: i64,
    pub group: String,
    pub name: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub description: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.error.name, self.error.message, self.error.code
        )
    }
}
