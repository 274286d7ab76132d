//! Confirmation monitoring.
//!
//! # Responsibilities
//! - Poll for the receipt of a broadcast transaction
//! - Count confirmations (the inclusion block counts as the first)
//! - Report revert on inclusion as a terminal failure

use std::time::Duration;

use alloy::primitives::TxHash;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::config::NetworkConfig;

/// Watches broadcast transactions until the ledger's verdict is final.
#[derive(Debug, Clone)]
pub struct TxWatcher {
    client: BlockchainClient,
    required_confirmations: u32,
    poll_interval: Duration,
    watch_timeout: Duration,
}

impl TxWatcher {
    pub fn new(client: BlockchainClient, config: &NetworkConfig) -> Self {
        Self {
            client,
            required_confirmations: config.confirmation_blocks.max(1),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            watch_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        }
    }

    /// Wait for a transaction to be confirmed or to revert.
    ///
    /// Returns `Err` only when the watch itself fails (timeout or unreachable ledger);
    /// the transaction's own outcome is always an `Ok` status.
    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let required = self.required_confirmations;

        let result = timeout(self.watch_timeout, async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Ok(ConfirmationStatus::Failed(
                        "Transaction reverted".to_string(),
                    ));
                }

                let current_block = self.client.get_block_number().await?;
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = confirmations(current_block, tx_block);

                if confirmations >= required {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = required,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(
                self.watch_timeout.as_secs(),
            )),
        }
    }
}

fn confirmations(current_block: u64, tx_block: u64) -> u32 {
    let depth = current_block.saturating_sub(tx_block).saturating_add(1);
    u32::try_from(depth).unwrap_or(u32::MAX)
}
