//! CLI and environment configuration, and run-mode resolution.
//!
//! The credential flags are mutually exclusive and select the run mode:
//! none -> print the interactive login URL, `--auth-url` -> exchange the
//! authorization code, `--token` -> one-shot snapshot, `--user`/`--pw` ->
//! background polling.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::net::SocketAddr;

pub const DEFAULT_SCOPE: &str = "accounts=ro balance=ro transactions=ro";

#[derive(Debug, Clone, Parser)]
#[command(name = "figo-exporter", about = "Prometheus exporter for the figo banking API")]
pub struct Config {
    /// OAuth client id
    #[arg(long, env = "FIGO_CLIENT_ID", default_value = "")]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long, env = "FIGO_CLIENT_SECRET", default_value = "")]
    pub client_secret: String,

    /// Scope to request access to
    #[arg(long, env = "FIGO_SCOPE", default_value = DEFAULT_SCOPE)]
    pub scope: String,

    /// Base URL of the upstream API
    #[arg(long = "baseurl", env = "FIGO_BASE_URL", default_value = "https://api.figo.me")]
    pub base_url: String,

    /// Address the exposition server listens on
    #[arg(long, env = "FIGO_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Username for background polling (password grant)
    #[arg(long = "user", env = "FIGO_USERNAME")]
    pub username: Option<String>,

    /// Password for background polling (password grant)
    #[arg(long = "pw", env = "FIGO_PASSWORD")]
    pub password: Option<String>,

    /// Manually obtained access token for a one-shot snapshot
    #[arg(long, env = "FIGO_TOKEN")]
    pub token: Option<String>,

    /// Authorization callback URL carrying the code to exchange
    #[arg(long = "auth-url", env = "FIGO_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Seconds between upstream polls in background mode
    #[arg(long = "interval-secs", env = "FIGO_INTERVAL_SECS", default_value_t = 300)]
    pub interval_secs: u64,
}

/// What the process does for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Print the interactive login URL and exit.
    Login,
    /// Exchange an authorization code for a token pair and exit.
    Exchange { code: String },
    /// Fetch once with a provided token, then serve the snapshot.
    Snapshot { token: String },
    /// Background refresh loop with password-grant credentials.
    Poll { username: String, password: String },
}

impl Config {
    /// Resolve the run mode from the credential flags.
    pub fn mode(&self) -> Result<Mode> {
        let credential_sources = [
            self.token.is_some(),
            self.auth_url.is_some(),
            self.username.is_some() || self.password.is_some(),
        ];
        if credential_sources.iter().filter(|set| **set).count() > 1 {
            bail!("--token, --auth-url, and --user/--pw are mutually exclusive");
        }

        if let Some(token) = &self.token {
            return Ok(Mode::Snapshot {
                token: token.clone(),
            });
        }

        if let Some(auth_url) = &self.auth_url {
            let code = extract_code(auth_url)?;
            return Ok(Mode::Exchange { code });
        }

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Mode::Poll {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None) => Ok(Mode::Login),
            _ => bail!("--user and --pw must be given together"),
        }
    }
}

fn extract_code(auth_url: &str) -> Result<String> {
    let url = url::Url::parse(auth_url).context("invalid authorization callback URL")?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .with_context(|| format!("no code parameter in callback URL {auth_url}"))
}
