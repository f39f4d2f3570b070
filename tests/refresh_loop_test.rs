//! Refresh-loop state machine tests against scripted API and authenticator
//! mocks. Time is paused so interval ticks fire without real waiting.

use async_trait::async_trait;
use figo_exporter::error::FigoError;
use figo_exporter::figo::auth::Authenticator;
use figo_exporter::figo::client::BankApi;
use figo_exporter::figo::models::{AccessToken, Account, ApiError, SyncStatus, Transaction};
use figo_exporter::metrics::Metrics;
use figo_exporter::scraper::{Credentials, Scraper};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct AuthInner {
    responses: Mutex<VecDeque<Result<AccessToken, FigoError>>>,
    calls: AtomicUsize,
}

#[derive(Clone)]
struct ScriptedAuth(Arc<AuthInner>);

impl ScriptedAuth {
    fn new(responses: Vec<Result<AccessToken, FigoError>>) -> Self {
        Self(Arc::new(AuthInner {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }))
    }

    fn calls(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for ScriptedAuth {
    async fn authenticate(
        &self,
        _username: &str,
        _password: &str,
        _scope: &str,
    ) -> Result<AccessToken, FigoError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FigoError::Auth {
                    reason: "auth script exhausted".to_string(),
                })
            })
    }
}

struct ApiInner {
    transactions: Mutex<VecDeque<Result<Vec<Transaction>, FigoError>>>,
    accounts: Mutex<VecDeque<Result<Vec<Account>, FigoError>>>,
    fetch_calls: AtomicUsize,
}

#[derive(Clone)]
struct ScriptedApi(Arc<ApiInner>);

impl ScriptedApi {
    fn new(
        transactions: Vec<Result<Vec<Transaction>, FigoError>>,
        accounts: Vec<Result<Vec<Account>, FigoError>>,
    ) -> Self {
        Self(Arc::new(ApiInner {
            transactions: Mutex::new(transactions.into()),
            accounts: Mutex::new(accounts.into()),
            fetch_calls: AtomicUsize::new(0),
        }))
    }

    fn fetch_calls(&self) -> usize {
        self.0.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BankApi for ScriptedApi {
    async fn fetch_accounts(&self, _token: &AccessToken) -> Result<Vec<Account>, FigoError> {
        self.0
            .accounts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_transactions(
        &self,
        _token: &AccessToken,
    ) -> Result<Vec<Transaction>, FigoError> {
        self.0.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.0
            .transactions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FigoError::Unauthorized))
    }
}

fn credentials() -> Credentials {
    Credentials {
        username: "operator".to_string(),
        password: "hunter2".to_string(),
        scope: "accounts=ro balance=ro transactions=ro".to_string(),
    }
}

fn auth_failure() -> FigoError {
    FigoError::Auth {
        reason: "credentials rejected".to_string(),
    }
}

fn scraper(
    api: &ScriptedApi,
    auth: &ScriptedAuth,
    metrics: &Metrics,
) -> Scraper<ScriptedApi, ScriptedAuth> {
    Scraper::new(
        api.clone(),
        auth.clone(),
        credentials(),
        Duration::from_secs(300),
        metrics.clone(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_initial_auth_failure_is_fatal_before_any_fetch() {
    let auth = ScriptedAuth::new(vec![Err(auth_failure())]);
    let api = ScriptedApi::new(vec![], vec![]);
    let metrics = Metrics::new().expect("Failed to create metrics");

    let result = scraper(&api, &auth, &metrics).run().await;

    assert!(matches!(result, Err(FigoError::Auth { .. })));
    assert_eq!(auth.calls(), 1);
    assert_eq!(api.fetch_calls(), 0, "no poll may run without a token");
}

#[tokio::test(start_paused = true)]
async fn test_401_triggers_exactly_one_reauth_in_same_cycle() {
    // First token accepted, reauthentication then fails so the loop ends
    // and the call counts can be inspected.
    let auth = ScriptedAuth::new(vec![
        Ok(AccessToken::new("token-1")),
        Err(auth_failure()),
    ]);
    let api = ScriptedApi::new(vec![Err(FigoError::Unauthorized)], vec![]);
    let metrics = Metrics::new().expect("Failed to create metrics");

    let result = scraper(&api, &auth, &metrics).run().await;

    assert!(matches!(result, Err(FigoError::Auth { .. })));
    // one initial auth + exactly one reauth for the single 401, no more
    assert_eq!(auth.calls(), 2);
    assert_eq!(api.fetch_calls(), 1);
    assert_eq!(
        metrics.scrape_errors_total.get(),
        0.0,
        "401 must not be counted as a scrape error"
    );
}

#[tokio::test(start_paused = true)]
async fn test_generic_api_error_keeps_loop_alive_and_counts() {
    let auth = ScriptedAuth::new(vec![
        Ok(AccessToken::new("token-1")),
        Err(auth_failure()),
    ]);
    // cycle 1: generic API error, cycle 2: success, cycle 3: 401 -> fatal reauth
    let api = ScriptedApi::new(
        vec![
            Err(FigoError::Api(ApiError::default())),
            Ok(Vec::new()),
            Err(FigoError::Unauthorized),
        ],
        vec![],
    );
    let metrics = Metrics::new().expect("Failed to create metrics");

    let result = scraper(&api, &auth, &metrics).run().await;

    assert!(result.is_err());
    assert_eq!(api.fetch_calls(), 3, "loop must survive the generic error");
    assert_eq!(metrics.scrape_errors_total.get(), 1.0);
    assert_eq!(auth.calls(), 2, "generic errors must not reauthenticate");
}

#[tokio::test(start_paused = true)]
async fn test_successful_poll_publishes_metrics() {
    let auth = ScriptedAuth::new(vec![
        Ok(AccessToken::new("token-1")),
        Err(auth_failure()),
    ]);

    let account = Account {
        account_id: "A1".to_string(),
        name: "Checking".to_string(),
        bank_id: "B1".to_string(),
        account_type: "Giro account".to_string(),
        currency: "EUR".to_string(),
        sync_enabled: true,
        status: SyncStatus {
            code: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let transaction = Transaction {
        account_id: "A1".to_string(),
        transaction_type: "Transfer".to_string(),
        currency: "EUR".to_string(),
        amount: 12.5,
        ..Default::default()
    };

    let api = ScriptedApi::new(
        vec![Ok(vec![transaction]), Err(FigoError::Unauthorized)],
        vec![Ok(vec![account])],
    );
    let metrics = Metrics::new().expect("Failed to create metrics");

    let result = scraper(&api, &auth, &metrics).run().await;
    assert!(result.is_err());

    let output = metrics.render();
    assert!(output.contains("figo_account_sync_enabled"));
    assert!(output.contains("accountid=\"A1\""));
    assert!(output.contains("figo_transaction_amount"));
    // the poll was timed
    assert!(output.contains("figo_scrape_duration_seconds_count"));
}
