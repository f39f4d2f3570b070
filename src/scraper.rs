//! Background refresh loop keeping the exported metrics current.
//!
//! The loop is the sole writer of the metric registry and the only holder of
//! the access token. It is an ordinary future returned to the caller; the
//! top-level process awaits it and treats an `Err` as fatal.

use crate::error::FigoError;
use crate::figo::auth::Authenticator;
use crate::figo::client::BankApi;
use crate::figo::models::AccessToken;
use crate::mapper;
use crate::metrics::Metrics;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Credentials for the password-grant background mode.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub scope: String,
}

/// Periodic fetch -> map -> publish driver.
///
/// State machine: starts unauthenticated, obtains a token, then polls on a
/// fixed cadence. A 401 drops the token and reauthenticates within the same
/// cycle; any other poll failure is counted and logged without touching the
/// token. Failure to (re)authenticate ends the loop with an error.
pub struct Scraper<A, T> {
    api: A,
    authenticator: T,
    credentials: Credentials,
    interval: Duration,
    metrics: Metrics,
}

impl<A: BankApi, T: Authenticator> Scraper<A, T> {
    pub fn new(
        api: A,
        authenticator: T,
        credentials: Credentials,
        interval: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            api,
            authenticator,
            credentials,
            interval,
            metrics,
        }
    }

    /// Run until a fatal authentication failure.
    ///
    /// The first poll fires immediately after the initial authentication,
    /// then once per interval. A slow upstream call delays the next tick
    /// rather than stacking polls.
    pub async fn run(self) -> Result<(), FigoError> {
        let mut token = self.authenticate().await?;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.poll(&token).await {
                Ok(()) => {}
                Err(FigoError::Unauthorized) => {
                    warn!("access token rejected by upstream, reauthenticating");
                    token = self.authenticate().await?;
                }
                Err(err) => {
                    self.metrics.scrape_errors_total.inc();
                    error!("scraping failed: {err}");
                }
            }
        }
    }

    async fn authenticate(&self) -> Result<AccessToken, FigoError> {
        let token = self
            .authenticator
            .authenticate(
                &self.credentials.username,
                &self.credentials.password,
                &self.credentials.scope,
            )
            .await?;
        info!("authenticated with upstream API");
        Ok(token)
    }

    async fn poll(&self, token: &AccessToken) -> Result<(), FigoError> {
        // observes on drop, so failed polls are timed too
        let _timer = self.metrics.scrape_duration_seconds.start_timer();

        let transactions = self.api.fetch_transactions(token).await?;
        let accounts = self.api.fetch_accounts(token).await?;
        mapper::publish(&self.metrics, &accounts, &transactions);

        info!(
            accounts = accounts.len(),
            transactions = transactions.len(),
            "metrics refreshed"
        );
        Ok(())
    }
}
