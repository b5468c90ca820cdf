//! Metrics collection.
//!
//! Counters go through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.
//!
//! # Metrics
//! - `vault_wallets_created_total` (counter): wallets by origin
//!   (`generated`, `phrase`, `private_key`)
//! - `vault_transactions_total` (counter): sends by network and outcome
//!   (`confirmed`, `pending`, `reverted`, `rejected`, `failed`)
//! - `vault_rpc_errors_total` (counter): failed RPC calls by network,
//!   operation and kind (`rpc`, `timeout`)

/// Count a created or imported wallet.
pub fn record_wallet_created(origin: &'static str) {
    metrics::counter!("vault_wallets_created_total", "origin" => origin).increment(1);
}

/// Count a finished send.
pub fn record_transaction(network: &str, outcome: &'static str) {
    metrics::counter!(
        "vault_transactions_total",
        "network" => network.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Count a failed RPC call.
pub fn record_rpc_error(network: &str, operation: &'static str, kind: &'static str) {
    metrics::counter!(
        "vault_rpc_errors_total",
        "network" => network.to_string(),
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
}
