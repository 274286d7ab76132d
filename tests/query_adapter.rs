//! Cached reads through the query adapter.

use std::sync::Arc;

use alloy::primitives::{Address, U256};

use blx_client::calc::swap::{fee_bps_or, quote_swap, SwapDirection};
use blx_client::codec::{AssetId, BaseAmount};
use blx_client::config::ContractAddresses;
use blx_client::query::types::{AllowanceRecord, ReservePair};
use blx_client::query::{ChainQueries, InvalidationScope, Observable, QueryError, QueryKey};

mod common;
use common::{blx, owner, MockLedger};

#[tokio::test]
async fn test_stale_value_survives_failed_refresh() {
    let ledger = Arc::new(MockLedger::new());
    let queries = common::queries(&ledger);

    let first = queries.reserves().await;
    assert_eq!(first.value.unwrap().reserve0, U256::from(1_000_000));

    assert_eq!(queries.invalidate(&InvalidationScope::PoolState), 1);
    let stale = queries.snapshot::<ReservePair>(&QueryKey::Reserves);
    assert!(stale.is_stale);
    assert!(stale.value.is_some());
    assert_eq!(stale.fresh_value(), None);

    ledger.fail_all_reads(true);
    let failed = queries.reserves().await;
    assert_eq!(failed.value, first.value, "last good value stays visible");
    assert!(failed.error.unwrap().contains("timeout"));
    assert!(!failed.is_loading);

    ledger.fail_all_reads(false);
    ledger.set_reserves(2_000_000, 500_000);
    let recovered = queries.reserves().await;
    assert_eq!(recovered.error, None);
    assert!(!recovered.is_stale);
    assert_eq!(recovered.value.unwrap().reserve1, U256::from(500_000));
}

#[tokio::test]
async fn test_refresh_reads_exactly_once_without_retry() {
    let ledger = Arc::new(MockLedger::new());
    let queries = common::queries(&ledger);

    queries.reserves().await;
    assert_eq!(ledger.reads_of("reserves"), 1);

    ledger.fail_all_reads(true);
    let failed = queries.reserves().await;
    assert!(failed.error.is_some());
    assert_eq!(ledger.reads_of("reserves"), 2);
}

#[tokio::test]
async fn test_absent_identity_disables_account_queries() {
    let ledger = Arc::new(MockLedger::new());
    let queries = common::queries(&ledger);

    let balance = queries.token_balance(AssetId::Blx, None).await;
    assert_eq!(balance, Observable::disabled());

    let allowance = queries
        .allowance(AssetId::Blx, None, ledger.contracts.tiered_staking)
        .await;
    assert_eq!(allowance, Observable::disabled());
    assert_eq!(queries.stakes(None).await, Observable::disabled());

    assert_eq!(ledger.reads_of("token_balance"), 0);
    assert_eq!(ledger.reads_of("allowance"), 0);
    assert_eq!(ledger.reads_of("stake_list"), 0);
    assert!(queries.cache().is_empty());
}

#[tokio::test]
async fn test_allowance_reports_the_queried_triple() {
    let ledger = Arc::new(MockLedger::new());
    let staking = ledger.contracts.tiered_staking;
    ledger.set_allowance(AssetId::Blx, staking, 250);
    let queries = common::queries(&ledger);

    let allowance = queries.allowance(AssetId::Blx, Some(owner()), staking).await;

    assert_eq!(
        allowance.value,
        Some(AllowanceRecord {
            owner: owner(),
            spender: staking,
            asset: AssetId::Blx,
            amount: U256::from(250),
        })
    );
    assert!(allowance.is_enabled);
    assert_eq!(ledger.reads_of("allowance"), 1);
}

#[tokio::test]
async fn test_unfetched_snapshot_is_enabled_but_empty() {
    let ledger = Arc::new(MockLedger::new());
    let queries = common::queries(&ledger);
    let key = QueryKey::TokenBalance {
        asset: AssetId::Blx,
        owner: owner(),
    };

    let snapshot = queries.snapshot::<U256>(&key);
    assert_eq!(snapshot, Observable::unfetched());
    assert!(snapshot.is_enabled);
    assert_ne!(snapshot, Observable::disabled());

    let disabled = queries.token_balance(AssetId::Blx, None).await;
    assert!(!disabled.is_enabled);
    assert_eq!(ledger.reads_of("token_balance"), 0);
}

#[tokio::test]
async fn test_unconfigured_liquid_staking_is_disabled() {
    let ledger = Arc::new(MockLedger::new());
    let contracts = ContractAddresses {
        liquid_staking: Address::ZERO,
        ..ContractAddresses::default()
    };
    let queries = ChainQueries::new(ledger.clone(), contracts);

    assert_eq!(queries.liquid_totals().await, Observable::disabled());
    assert_eq!(
        queries.liquid_stake(Some(owner()), 0).await,
        Observable::disabled()
    );
    assert_eq!(
        queries.fetch(QueryKey::LiquidTotals).await.unwrap_err(),
        QueryError::Disabled("liquid_totals")
    );
    assert_eq!(ledger.reads_of("liquid_totals"), 0);
    assert_eq!(ledger.reads_of("liquid_stake"), 0);
}

#[tokio::test]
async fn test_unexpected_shape_is_reported() {
    let ledger = Arc::new(MockLedger::new());
    let queries = common::queries(&ledger);

    let err = queries
        .fetch_as::<bool>(QueryKey::Reserves)
        .await
        .unwrap_err();
    assert_eq!(err, QueryError::UnexpectedShape("reserves"));
}

#[tokio::test]
async fn test_clones_share_one_cache() {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_balance(AssetId::Blx, 42);
    let queries = common::queries(&ledger);
    let other = queries.clone();

    queries.token_balance(AssetId::Blx, Some(owner())).await;

    let key = QueryKey::TokenBalance {
        asset: AssetId::Blx,
        owner: owner(),
    };
    assert_eq!(other.snapshot::<U256>(&key).value, Some(U256::from(42)));
    assert_eq!(ledger.reads_of("token_balance"), 1);
}

#[tokio::test]
async fn test_local_quote_from_fetched_pool_state() {
    let ledger = Arc::new(MockLedger::new());
    let queries = common::queries(&ledger);

    let reserves = queries.reserves().await.value.unwrap();
    let fee = fee_bps_or(queries.swap_fee().await.fresh_value().copied(), 30).unwrap();
    let quote = quote_swap(blx(1_000), SwapDirection::BlxToUsdc, &reserves, fee, 100).unwrap();

    assert_eq!(quote.amount_out, BaseAmount::from_units(AssetId::Usdc, U256::from(996)));
    assert_eq!(
        quote.min_amount_out,
        BaseAmount::from_units(AssetId::Usdc, U256::from(986))
    );
}
