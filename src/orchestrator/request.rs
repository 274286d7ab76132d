//! What a caller asks the orchestrator to do, and what each write makes stale.

use alloy::primitives::Address;

use crate::calc::staking::StakingProgram;
use crate::codec::AssetId;
use crate::config::ContractAddresses;
use crate::contracts::ContractCall;
use crate::query::{InvalidationScope, QueryKey};

/// One logical flow: an action plus whether missing approvals may be sent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRequest {
    pub action: ContractCall,
    /// When false, an insufficient allowance rejects the request instead.
    pub auto_authorize: bool,
}

impl FlowRequest {
    pub fn new(action: ContractCall) -> Self {
        Self {
            action,
            auto_authorize: true,
        }
    }

    pub fn without_authorization(mut self) -> Self {
        self.auto_authorize = false;
        self
    }
}

impl From<ContractCall> for FlowRequest {
    fn from(action: ContractCall) -> Self {
        Self::new(action)
    }
}

fn balance(asset: AssetId, owner: Address) -> InvalidationScope {
    InvalidationScope::Exact(QueryKey::TokenBalance { asset, owner })
}

fn allowance(asset: AssetId, owner: Address, spender: Address) -> InvalidationScope {
    InvalidationScope::Exact(QueryKey::Allowance {
        asset,
        owner,
        spender,
    })
}

/// Cached reads that may no longer match the ledger once `call` has been included.
pub fn invalidated_by(
    call: &ContractCall,
    owner: Address,
    contracts: &ContractAddresses,
) -> Vec<InvalidationScope> {
    let mut scopes: Vec<InvalidationScope> = call
        .spends(contracts)
        .iter()
        .map(|spend| allowance(spend.amount.asset(), owner, spend.spender))
        .collect();

    match call {
        ContractCall::Approve { amount, spender } => {
            scopes.push(allowance(amount.asset(), owner, *spender));
        }
        ContractCall::Swap { direction, .. } => {
            scopes.push(balance(direction.input_asset(), owner));
            scopes.push(balance(direction.output_asset(), owner));
            scopes.push(InvalidationScope::PoolState);
        }
        ContractCall::AddLiquidity { .. } | ContractCall::RemoveLiquidity { .. } => {
            scopes.push(balance(AssetId::Blx, owner));
            scopes.push(balance(AssetId::Usdc, owner));
            scopes.push(balance(AssetId::Lp, owner));
            scopes.push(InvalidationScope::PoolState);
        }
        ContractCall::Stake { program, .. } | ContractCall::Unstake { program, .. } => {
            scopes.push(balance(AssetId::Blx, owner));
            if *program == StakingProgram::Liquid {
                scopes.push(balance(AssetId::StBlx, owner));
            }
            scopes.push(InvalidationScope::Stakes {
                program: *program,
                owner,
            });
        }
        ContractCall::VaultDeposit { .. }
        | ContractCall::VaultWithdraw { .. }
        | ContractCall::VaultEmergencyWithdraw => {
            scopes.push(balance(AssetId::Blx, owner));
            scopes.push(InvalidationScope::VaultEntries { owner });
        }
        ContractCall::VaultToggleAutoStake { .. } => {
            scopes.push(InvalidationScope::VaultEntries { owner });
        }
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    use crate::calc::staking::StakeLock;
    use crate::codec::BaseAmount;

    #[test]
    fn test_stake_invalidates_allowance_and_positions() {
        let contracts = ContractAddresses::default();
        let owner = Address::repeat_byte(7);
        let amount = BaseAmount::from_units(AssetId::Blx, U256::from(500));
        let call = ContractCall::stake(StakingProgram::Tiered, amount, StakeLock::Days30).unwrap();

        let scopes = invalidated_by(&call, owner, &contracts);
        let allowance_key = QueryKey::Allowance {
            asset: AssetId::Blx,
            owner,
            spender: contracts.tiered_staking,
        };
        assert!(scopes.iter().any(|s| s.matches(&allowance_key)));
        assert!(scopes.iter().any(|s| s.matches(&QueryKey::StakeList { owner })));
        assert!(!scopes.iter().any(|s| s.matches(&QueryKey::Reserves)));
    }

    #[test]
    fn test_approve_invalidates_its_allowance() {
        let contracts = ContractAddresses::default();
        let owner = Address::repeat_byte(7);
        let amount = BaseAmount::from_units(AssetId::Usdc, U256::from(1));
        let call = ContractCall::approve(amount, contracts.pool);

        let scopes = invalidated_by(&call, owner, &contracts);
        assert_eq!(
            scopes,
            vec![InvalidationScope::Exact(QueryKey::Allowance {
                asset: AssetId::Usdc,
                owner,
                spender: contracts.pool,
            })]
        );
    }

    #[test]
    fn test_flow_request_defaults() {
        let request = FlowRequest::from(ContractCall::VaultEmergencyWithdraw);
        assert!(request.auto_authorize);
        assert!(!request.without_authorization().auto_authorize);
    }
}
