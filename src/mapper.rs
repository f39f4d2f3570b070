//! Mapping from fetched API records to the exported metric families.
//!
//! This is the single mapping pass used by both the background polling mode
//! and the one-shot token mode. It holds no state of its own: publishing the
//! same input twice yields the same label-tuple to value mapping.

use crate::figo::models::{Account, Transaction};
use crate::metrics::Metrics;

/// Publish one snapshot of accounts and transactions into the registry.
///
/// Balances are set, not accumulated; a poll must never double-count the
/// previous cycle. Transaction amounts are a per-tuple sum over the given
/// slice, so the family is cleared before summing to keep the pass
/// idempotent. An account without a balance object simply gets no balance
/// series.
pub fn publish(metrics: &Metrics, accounts: &[Account], transactions: &[Transaction]) {
    metrics.transaction_amount.reset();
    for tx in transactions {
        metrics
            .transaction_amount
            .with_label_values(&[
                tx.account_id.as_str(),
                tx.transaction_type.as_str(),
                tx.currency.as_str(),
            ])
            .add(tx.amount);
    }

    for account in accounts {
        metrics
            .account_sync_enabled
            .with_label_values(&[
                account.account_id.as_str(),
                account.name.as_str(),
                account.bank_id.as_str(),
                account.account_type.as_str(),
            ])
            .set(if account.sync_enabled { 1.0 } else { 0.0 });

        if let Some(balance) = &account.balance {
            metrics
                .account_balance
                .with_label_values(&[
                    account.account_id.as_str(),
                    account.name.as_str(),
                    account.bank_id.as_str(),
                    account.account_type.as_str(),
                    account.currency.as_str(),
                ])
                .set(balance.balance);
        }

        let status_error = if account.status.is_healthy() {
            0.0
        } else {
            -(account.status.code as f64)
        };
        metrics
            .account_sync_status_error
            .with_label_values(&[account.account_id.as_str(), account.name.as_str()])
            .set(status_error);
    }
}
