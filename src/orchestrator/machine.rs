//! The transaction state machine.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::sync::watch;
use uuid::Uuid;

use crate::authorization::needs_authorization;
use crate::blockchain::types::{BlockchainError, ChainId, ConfirmationStatus};
use crate::config::ContractAddresses;
use crate::contracts::ContractCall;
use crate::observability::metrics;
use crate::orchestrator::ledger::LedgerWriter;
use crate::orchestrator::request::{invalidated_by, FlowRequest};
use crate::orchestrator::state::{
    FailureReason, OrchestratorError, PendingTransaction, Phase, SequenceOutcome, TxHandle, TxKind,
};
use crate::query::{ChainQueries, LedgerReader, QueryKey};

/// An accepted request: its remaining steps and what has happened so far.
#[derive(Debug)]
struct Sequence {
    id: Uuid,
    owner: Address,
    action: &'static str,
    steps: VecDeque<(TxKind, ContractCall)>,
    pending: Option<PendingTransaction>,
    transactions: Vec<TxHandle>,
    phases: Vec<Phase>,
}

/// Sequences authorization and action transactions for one logical flow.
///
/// At most one sequence is in flight. A submission while one is outstanding is rejected,
/// never queued. The dependent action is built when the request is accepted and sent
/// unchanged once every authorization before it has confirmed.
pub struct TransactionOrchestrator<L> {
    ledger: Arc<L>,
    queries: ChainQueries<L>,
    expected_chain: ChainId,
    phase: watch::Sender<Phase>,
    sequence: Option<Sequence>,
    last_outcome: Option<SequenceOutcome>,
}

impl<L: LedgerReader + LedgerWriter> TransactionOrchestrator<L> {
    pub fn new(ledger: Arc<L>, contracts: ContractAddresses, expected_chain: ChainId) -> Self {
        let queries = ChainQueries::new(ledger.clone(), contracts);
        Self::with_queries(ledger, queries, expected_chain)
    }

    /// Share an existing query cache with the rest of the client.
    pub fn with_queries(ledger: Arc<L>, queries: ChainQueries<L>, expected_chain: ChainId) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            ledger,
            queries,
            expected_chain,
            phase,
            sequence: None,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.borrow().clone()
    }

    /// Receiver that sees every published phase change.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    pub fn pending(&self) -> Option<&PendingTransaction> {
        self.sequence.as_ref().and_then(|s| s.pending.as_ref())
    }

    /// Outcome of the most recently finished sequence.
    pub fn last_outcome(&self) -> Option<&SequenceOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn queries(&self) -> &ChainQueries<L> {
        &self.queries
    }

    fn set_phase(&mut self, phase: Phase) {
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.phases.push(phase.clone());
        }
        self.phase.send_replace(phase);
    }

    /// Accept a request and broadcast its first transaction.
    ///
    /// Pre-flight order: network, balances, then a fresh allowance per spent asset. Any
    /// pre-flight rejection leaves the orchestrator untouched.
    pub async fn submit(
        &mut self,
        request: impl Into<FlowRequest>,
    ) -> Result<TxHandle, OrchestratorError> {
        let request = request.into();
        if self.sequence.is_some() {
            tracing::warn!(
                action = request.action.name(),
                "Rejected submission: sequence already in progress"
            );
            return Err(OrchestratorError::AlreadyInProgress);
        }

        let owner = self.ledger.sender().ok_or(OrchestratorError::NoAccount)?;
        self.verify_network().await?;
        self.check_balances(&request.action, owner).await?;
        let authorizations = self.plan_authorizations(&request, owner).await?;

        let mut steps: VecDeque<(TxKind, ContractCall)> = authorizations
            .into_iter()
            .map(|call| (TxKind::Authorization, call))
            .collect();
        let action = request.action.name();
        steps.push_back((TxKind::Action, request.action));

        let id = Uuid::new_v4();
        tracing::info!(
            sequence_id = %id,
            action,
            authorizations = steps.len() - 1,
            "Starting transaction sequence"
        );

        self.sequence = Some(Sequence {
            id,
            owner,
            action,
            steps,
            pending: None,
            transactions: Vec::new(),
            phases: Vec::new(),
        });
        self.submit_next().await
    }

    async fn verify_network(&self) -> Result<(), OrchestratorError> {
        let actual = self.ledger.chain_id().await?;
        if actual != self.expected_chain {
            tracing::warn!(
                expected = %self.expected_chain,
                actual = %actual,
                "Refusing write on wrong network"
            );
            return Err(OrchestratorError::WrongNetwork {
                expected: self.expected_chain,
                actual,
            });
        }
        Ok(())
    }

    async fn check_balances(
        &self,
        action: &ContractCall,
        owner: Address,
    ) -> Result<(), OrchestratorError> {
        for debit in action.debits(self.queries.contracts()) {
            let key = QueryKey::TokenBalance {
                asset: debit.asset(),
                owner,
            };
            let available: U256 = self.queries.fetch_as(key).await?;
            if available < debit.units() {
                return Err(OrchestratorError::InsufficientBalance {
                    asset: debit.asset(),
                    required: debit.units(),
                    available,
                });
            }
        }
        Ok(())
    }

    async fn plan_authorizations(
        &self,
        request: &FlowRequest,
        owner: Address,
    ) -> Result<Vec<ContractCall>, OrchestratorError> {
        let mut calls = Vec::new();
        for spend in request.action.spends(self.queries.contracts()) {
            let asset = spend.amount.asset();
            let key = QueryKey::Allowance {
                asset,
                owner,
                spender: spend.spender,
            };
            let current = match self.queries.fetch_as::<U256>(key).await {
                Ok(allowance) => Some(allowance),
                Err(e) => {
                    tracing::warn!(asset = %asset, error = %e, "Allowance unknown, treating as insufficient");
                    None
                }
            };

            if needs_authorization(spend.amount.units(), current) {
                if !request.auto_authorize {
                    return Err(OrchestratorError::InsufficientAllowance {
                        asset,
                        required: spend.amount.units(),
                        current,
                    });
                }
                calls.push(spend.authorization());
            }
        }
        Ok(calls)
    }

    async fn submit_next(&mut self) -> Result<TxHandle, OrchestratorError> {
        let (kind, call) = self
            .sequence
            .as_mut()
            .and_then(|s| s.steps.pop_front())
            .ok_or(OrchestratorError::NothingPending)?;

        self.set_phase(Phase::Submitting { kind });

        // Pre-flight verified the chain for the first step; chained steps re-check.
        let chained = self
            .sequence
            .as_ref()
            .is_some_and(|s| !s.transactions.is_empty());
        if chained {
            if let Err(error) = self.verify_network().await {
                self.finish(
                    Phase::Failed {
                        kind,
                        reason: FailureReason::from(&error),
                    },
                    None,
                );
                return Err(error);
            }
        }

        tracing::info!(kind = %kind, call = %call, "Submitting transaction");
        match self.ledger.submit(&call).await {
            Ok(handle) => {
                metrics::record_transaction_submitted(kind.label());
                if let Some(sequence) = self.sequence.as_mut() {
                    let dependent = sequence.steps.front().map(|(_, next)| next.clone());
                    sequence.transactions.push(handle);
                    sequence.pending = Some(PendingTransaction {
                        handle,
                        kind,
                        call,
                        dependent,
                    });
                }
                self.set_phase(Phase::AwaitingConfirmation { handle, kind });
                tracing::info!(handle = %handle, kind = %kind, "Awaiting confirmation");
                Ok(handle)
            }
            Err(e) => {
                let error = OrchestratorError::from(e);
                tracing::warn!(kind = %kind, error = %error, "Submission failed");
                self.finish(
                    Phase::Failed {
                        kind,
                        reason: FailureReason::from(&error),
                    },
                    None,
                );
                Err(error)
            }
        }
    }

    fn pending_for(&self, handle: TxHandle) -> Result<PendingTransaction, OrchestratorError> {
        match self.pending() {
            Some(pending) if pending.handle == handle => Ok(pending.clone()),
            _ => {
                tracing::debug!(handle = %handle, "Ignoring event for a transaction outside the sequence");
                Err(OrchestratorError::UnknownHandle(handle))
            }
        }
    }

    /// Feed a confirmation event for the pending transaction.
    ///
    /// A confirmed authorization immediately submits the next step. Returns the phase
    /// this event produced; terminal phases are followed by `Idle`.
    pub async fn on_confirmation(
        &mut self,
        handle: TxHandle,
        status: ConfirmationStatus,
    ) -> Result<Phase, OrchestratorError> {
        let pending = self.pending_for(handle)?;

        match status {
            ConfirmationStatus::Pending | ConfirmationStatus::Confirming { .. } => Ok(self.phase()),
            ConfirmationStatus::Confirmed { block_number } => {
                self.invalidate_after(&pending.call);
                metrics::record_transaction_finished(pending.kind.label(), "confirmed");
                tracing::info!(
                    handle = %handle,
                    kind = %pending.kind,
                    block_number,
                    "Transaction confirmed"
                );
                if let Some(sequence) = self.sequence.as_mut() {
                    sequence.pending = None;
                }

                match pending.kind {
                    TxKind::Authorization => {
                        self.set_phase(Phase::Confirmed {
                            kind: TxKind::Authorization,
                        });
                        self.submit_next().await?;
                        Ok(self.phase())
                    }
                    TxKind::Action => Ok(self.finish(
                        Phase::Confirmed {
                            kind: TxKind::Action,
                        },
                        Some(block_number),
                    )),
                }
            }
            ConfirmationStatus::Failed(reason) => {
                self.invalidate_after(&pending.call);
                tracing::warn!(handle = %handle, kind = %pending.kind, reason = %reason, "Transaction failed");
                Ok(self.finish(
                    Phase::Failed {
                        kind: pending.kind,
                        reason: FailureReason::Reverted(reason),
                    },
                    None,
                ))
            }
        }
    }

    /// The confirmation watch itself failed; the transaction's fate is unknown.
    pub fn on_watch_failure(
        &mut self,
        handle: TxHandle,
        error: BlockchainError,
    ) -> Result<Phase, OrchestratorError> {
        let pending = self.pending_for(handle)?;
        self.invalidate_after(&pending.call);
        tracing::warn!(handle = %handle, error = %error, "Confirmation watch failed");
        Ok(self.finish(
            Phase::Failed {
                kind: pending.kind,
                reason: FailureReason::Network(error.to_string()),
            },
            None,
        ))
    }

    /// Stop watching the in-flight sequence and return to `Idle`.
    ///
    /// An already broadcast transaction may still be included; the next submission
    /// re-reads allowances and balances, so nothing stale is trusted.
    pub fn abandon(&mut self) -> Option<SequenceOutcome> {
        let pending = self.sequence.as_ref()?.pending.clone();
        let kind = pending.as_ref().map_or(TxKind::Action, |p| p.kind);
        if let Some(pending) = &pending {
            tracing::warn!(handle = %pending.handle, kind = %kind, "Abandoning confirmation watch");
            self.invalidate_after(&pending.call);
        }
        self.finish(
            Phase::Failed {
                kind,
                reason: FailureReason::Abandoned,
            },
            None,
        );
        self.last_outcome.clone()
    }

    /// Watch the in-flight sequence to its end, advancing through every step.
    pub async fn drive(&mut self) -> Result<SequenceOutcome, OrchestratorError> {
        if self.sequence.is_none() {
            return Err(OrchestratorError::NothingPending);
        }

        while let Some(handle) = self.pending().map(|p| p.handle) {
            match self.ledger.wait_for_confirmation(handle).await {
                Ok(status) if status.is_terminal() => {
                    if let Err(e) = self.on_confirmation(handle, status).await {
                        tracing::debug!(error = %e, "Sequence ended while advancing");
                    }
                }
                Ok(status) => tracing::debug!(handle = %handle, status = ?status, "Still waiting"),
                Err(e) => {
                    self.on_watch_failure(handle, e)?;
                }
            }
        }

        self.last_outcome
            .clone()
            .ok_or(OrchestratorError::NothingPending)
    }

    /// Like `drive`, but abandons the sequence as soon as `cancel` resolves.
    pub async fn drive_until<F>(&mut self, cancel: F) -> Result<SequenceOutcome, OrchestratorError>
    where
        F: Future<Output = ()>,
    {
        let finished = {
            let drive = self.drive();
            tokio::pin!(drive);
            tokio::pin!(cancel);
            tokio::select! {
                outcome = &mut drive => Some(outcome),
                _ = &mut cancel => None,
            }
        };

        match finished {
            Some(outcome) => outcome,
            None => self.abandon().ok_or(OrchestratorError::NothingPending),
        }
    }

    fn invalidate_after(&self, call: &ContractCall) {
        let Some(owner) = self.sequence.as_ref().map(|s| s.owner) else {
            return;
        };
        for scope in invalidated_by(call, owner, self.queries.contracts()) {
            self.queries.invalidate(&scope);
        }
    }

    fn finish(&mut self, terminal: Phase, block_number: Option<u64>) -> Phase {
        self.set_phase(terminal.clone());
        if let Phase::Failed { kind, reason } = &terminal {
            metrics::record_transaction_finished(kind.label(), reason.label());
        }

        if let Some(sequence) = self.sequence.take() {
            if !sequence.steps.is_empty() {
                tracing::info!(
                    sequence_id = %sequence.id,
                    dropped = sequence.steps.len(),
                    "Dropping unsent steps"
                );
            }
            let outcome = SequenceOutcome {
                sequence_id: sequence.id,
                action: sequence.action,
                transactions: sequence.transactions,
                phases: sequence.phases,
                block_number,
            };
            tracing::info!(
                sequence_id = %outcome.sequence_id,
                action = outcome.action,
                succeeded = outcome.succeeded(),
                "Transaction sequence finished"
            );
            self.last_outcome = Some(outcome);
        }

        self.phase.send_replace(Phase::Idle);
        terminal
    }
}
