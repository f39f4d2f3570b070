use anyhow::{Context, Result};
use clap::Parser;
use figo_exporter::config::{Config, Mode};
use figo_exporter::figo::client::BankApi;
use figo_exporter::figo::models::AccessToken;
use figo_exporter::figo::FigoClient;
use figo_exporter::scraper::{Credentials, Scraper};
use figo_exporter::{Metrics, mapper, server};
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let config = Config::parse();
    let client = FigoClient::new(&config.base_url, &config.client_id, &config.client_secret)
        .context("failed to build API client")?;

    match config.mode()? {
        Mode::Login => {
            let login_url = client
                .obtain_login_url(&config.scope, "no-state")
                .await
                .context("failed to obtain login URL")?;
            println!("{login_url}");
        }
        Mode::Exchange { code } => {
            let pair = client
                .exchange_code(&code)
                .await
                .context("authorization code exchange failed")?;
            println!("access_token: {}", pair.access_token);
            println!("refresh_token: {}", pair.refresh_token);
        }
        Mode::Snapshot { token } => {
            let metrics = Metrics::new()?;
            let token = AccessToken::new(token);

            let transactions = client
                .fetch_transactions(&token)
                .await
                .context("failed to fetch transactions")?;
            let accounts = client
                .fetch_accounts(&token)
                .await
                .context("failed to fetch accounts")?;
            mapper::publish(&metrics, &accounts, &transactions);
            info!(
                accounts = accounts.len(),
                transactions = transactions.len(),
                "snapshot collected"
            );

            server::serve(config.addr, metrics).await?;
        }
        Mode::Poll { username, password } => {
            let metrics = Metrics::new()?;
            let credentials = Credentials {
                username,
                password,
                scope: config.scope.clone(),
            };
            let scraper = Scraper::new(
                client.clone(),
                client,
                credentials,
                Duration::from_secs(config.interval_secs),
                metrics.clone(),
            );

            // Either side failing is fatal: the process must not keep
            // serving stale metrics after an unrecoverable auth error.
            tokio::select! {
                result = scraper.run() => {
                    result.context("metric collection failed")?;
                }
                result = server::serve(config.addr, metrics) => {
                    result?;
                }
            }
        }
    }

    Ok(())
}
