//! Client, authenticator, and wire types for the figo aggregation API.

pub mod auth;
pub mod client;
pub mod models;

pub use auth::Authenticator;
pub use client::{BankApi, FigoClient};
pub use models::{AccessToken, Account, Balance, SyncStatus, TokenPair, Transaction};
