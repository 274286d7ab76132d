//! `blx-cli`: command-line front end for the BLX protocol client.
//!
//! Reads print JSON snapshots of ledger state and derived figures. Writes run one
//! transaction sequence (approvals first when needed) and print its outcome.
//!
//! The signing key is taken from `BLX_CLIENT_PRIVATE_KEY`; without it only reads work.

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::json;

use blx_client::blockchain::{BlockchainClient, ChainId, RpcLedger, Wallet};
use blx_client::calc::liquidity::{
    expected_withdrawal, liquidity_for_percent, pool_share_percent, pool_stats,
};
use blx_client::calc::staking::{
    lock_remaining, pending_reward_estimate, stake_withdrawable, StakeLock, StakingProgram,
};
use blx_client::calc::swap::{fee_bps_or, quote_swap, SwapDirection, SwapQuote};
use blx_client::calc::unix_now;
use blx_client::calc::vault::{withdrawal_preview, VaultLock};
use blx_client::codec::{AssetId, AssetRegistry, BaseAmount};
use blx_client::config::{load_config, validate_config, ClientConfig, ConfigError};
use blx_client::contracts::ContractCall;
use blx_client::lifecycle::{listen_for_ctrl_c, Shutdown};
use blx_client::observability::{logging, metrics};
use blx_client::orchestrator::{FailureReason, FlowRequest};
use blx_client::query::{ChainQueries, Observable};
use blx_client::{ClientError, TransactionOrchestrator};

#[derive(Parser)]
#[command(name = "blx-cli")]
#[command(about = "Client for the BLX pool, staking programs and vault", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in Sepolia defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Account to inspect when no signing key is configured.
    #[arg(long)]
    account: Option<Address>,

    /// Override the slippage tolerance from the config (basis points).
    #[arg(long)]
    slippage_bps: Option<u16>,

    /// Fail with InsufficientAllowance instead of sending approvals first.
    #[arg(long)]
    no_approve: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pool reserves, statistics, fee and your LP share
    Pool,
    /// Quote a swap locally and against the pool's own view
    Quote {
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum)]
        direction: SwapDirection,
    },
    /// Swap with a slippage-protected minimum output
    Swap {
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum)]
        direction: SwapDirection,
    },
    /// Add BLX and USDC liquidity
    AddLiquidity {
        #[arg(long)]
        blx: String,
        #[arg(long)]
        usdc: String,
    },
    /// Remove a percentage of your LP position
    RemoveLiquidity {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        percent: u8,
    },
    /// Stake BLX with a lock period
    Stake {
        #[arg(long, value_enum, default_value = "tiered")]
        program: StakingProgram,
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum)]
        lock: StakeLock,
    },
    /// Withdraw (tiered) or redeem (liquid) a stake by index
    Unstake {
        #[arg(long, value_enum, default_value = "tiered")]
        program: StakingProgram,
        #[arg(long)]
        index: u64,
    },
    /// Stake positions, rewards and lock countdowns
    Stakes {
        #[arg(long, value_enum, default_value = "tiered")]
        program: StakingProgram,
        /// Liquid positions are read one index at a time.
        #[arg(long, default_value_t = 0)]
        index: u64,
    },
    /// Vault deposits, withdrawal previews and totals
    Vault,
    /// Deposit BLX into the vault
    VaultDeposit {
        #[arg(long)]
        amount: String,
        #[arg(long, value_enum, default_value = "none")]
        lock: VaultLock,
        #[arg(long)]
        auto_stake: bool,
    },
    /// Withdraw a vault deposit by index
    VaultWithdraw {
        #[arg(long)]
        index: u64,
    },
    /// Toggle auto-staking of a vault deposit
    VaultToggle {
        #[arg(long)]
        index: u64,
    },
    /// Withdraw everything from the vault, paying the early-exit fee
    VaultEmergency,
}

/// Everything a command needs, built once.
struct Context {
    config: ClientConfig,
    assets: AssetRegistry,
    ledger: Arc<RpcLedger>,
    queries: ChainQueries<RpcLedger>,
    account: Option<Address>,
    slippage_bps: u16,
    no_approve: bool,
}

impl Context {
    fn account(&self) -> Result<Address, ClientError> {
        self.account.ok_or(ClientError::NoAccount)
    }

    fn parse(&self, text: &str, asset: AssetId) -> Result<BaseAmount, ClientError> {
        Ok(BaseAmount::parse_positive(text, self.assets.get(asset))?)
    }

    fn require_liquid_staking(&self, program: StakingProgram) -> Result<(), ClientError> {
        if program == StakingProgram::Liquid && !self.config.contracts.liquid_staking_enabled() {
            return Err(ClientError::Unavailable("liquid staking"));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = ClientConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    logging::init_logging(&config.observability.log_filter);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let wallet = Wallet::from_env_optional()?;
    let client = BlockchainClient::new(&config.network, wallet.as_ref())?;
    if let Err(e) = client.verify_chain_id().await {
        // Reads still work; writes re-check the chain before every broadcast.
        tracing::warn!(error = %e, "Chain verification failed at startup");
    }
    let ledger = Arc::new(RpcLedger::new(
        client,
        &config.network,
        config.contracts.clone(),
    ));
    let queries = ChainQueries::new(ledger.clone(), config.contracts.clone());

    let ctx = Context {
        account: wallet.as_ref().map(Wallet::address).or(cli.account),
        assets: AssetRegistry::from_config(&config.assets),
        slippage_bps: cli.slippage_bps.unwrap_or(config.trading.slippage_bps),
        no_approve: cli.no_approve,
        ledger,
        queries,
        config,
    };

    if let Err(e) = run(&ctx, cli.command).await {
        tracing::error!(kind = e.kind(), error = %e, "Command failed");
        return Err(e.into());
    }
    Ok(())
}

async fn run(ctx: &Context, command: Commands) -> Result<(), ClientError> {
    match command {
        Commands::Pool => show_pool(ctx).await,
        Commands::Quote { amount, direction } => show_quote(ctx, &amount, direction).await,
        Commands::Swap { amount, direction } => {
            let recipient = ctx.account()?;
            if ctx.queries.trading_enabled().await.value == Some(false) {
                return Err(ClientError::Unavailable("trading"));
            }
            let quote = build_quote(ctx, &amount, direction).await?;
            execute(ctx, ContractCall::swap(&quote, recipient)?).await
        }
        Commands::AddLiquidity { blx, usdc } => {
            let call = ContractCall::add_liquidity(
                ctx.parse(&blx, AssetId::Blx)?,
                ctx.parse(&usdc, AssetId::Usdc)?,
                ctx.slippage_bps,
                ctx.account()?,
            )?;
            execute(ctx, call).await
        }
        Commands::RemoveLiquidity { percent } => {
            let account = ctx.account()?;
            let lp_units = required(
                ctx.queries.token_balance(AssetId::Lp, Some(account)).await,
                "lp balance",
            )?;
            let liquidity = liquidity_for_percent(BaseAmount::from_units(AssetId::Lp, lp_units), percent)?;
            let reserves = required(ctx.queries.reserves().await, "reserves")?;
            let supply = required(ctx.queries.lp_total_supply().await, "lp total supply")?;
            let minimums =
                expected_withdrawal(liquidity, &reserves, supply)?.with_slippage(ctx.slippage_bps)?;
            execute(ctx, ContractCall::remove_liquidity(liquidity, &minimums, account)?).await
        }
        Commands::Stake {
            program,
            amount,
            lock,
        } => {
            ctx.require_liquid_staking(program)?;
            let call = ContractCall::stake(program, ctx.parse(&amount, AssetId::Blx)?, lock)?;
            execute(ctx, call).await
        }
        Commands::Unstake { program, index } => {
            ctx.require_liquid_staking(program)?;
            execute(ctx, ContractCall::Unstake { program, index }).await
        }
        Commands::Stakes { program, index } => show_stakes(ctx, program, index).await,
        Commands::Vault => show_vault(ctx).await,
        Commands::VaultDeposit {
            amount,
            lock,
            auto_stake,
        } => {
            let periods = ctx.queries.vault_lock_periods().await;
            let lock_period = lock.period_secs(periods.fresh_value());
            let call = ContractCall::vault_deposit(
                ctx.parse(&amount, AssetId::Blx)?,
                lock_period,
                auto_stake,
            )?;
            execute(ctx, call).await
        }
        Commands::VaultWithdraw { index } => execute(ctx, ContractCall::VaultWithdraw { index }).await,
        Commands::VaultToggle { index } => {
            execute(ctx, ContractCall::VaultToggleAutoStake { index }).await
        }
        Commands::VaultEmergency => execute(ctx, ContractCall::VaultEmergencyWithdraw).await,
    }
}

/// Run one sequence to completion, or until Ctrl-C abandons the watch.
async fn execute(ctx: &Context, call: ContractCall) -> Result<(), ClientError> {
    let mut orchestrator = TransactionOrchestrator::with_queries(
        ctx.ledger.clone(),
        ctx.queries.clone(),
        ChainId(ctx.config.network.chain_id),
    );

    let mut request = FlowRequest::new(call);
    if ctx.no_approve {
        request = request.without_authorization();
    }
    orchestrator.submit(request).await?;

    let shutdown = Shutdown::new();
    listen_for_ctrl_c(shutdown.clone());
    let outcome = orchestrator.drive_until(shutdown.notified()).await?;
    print_json(&outcome);

    match outcome.failure() {
        None => Ok(()),
        Some(FailureReason::Reverted(reason)) => Err(ClientError::TransactionReverted(reason.clone())),
        Some(FailureReason::Network(reason)) => Err(ClientError::NetworkFailure(reason.clone())),
        Some(FailureReason::Abandoned) => Err(ClientError::NetworkFailure(
            "confirmation watch abandoned; the transaction may still be included".to_string(),
        )),
    }
}

/// A freshly refreshed value, or the reason it is missing.
fn required<T>(observed: Observable<T>, what: &'static str) -> Result<T, ClientError> {
    if let Some(error) = observed.error {
        return Err(ClientError::NetworkFailure(format!("{what}: {error}")));
    }
    observed.value.ok_or(ClientError::Unavailable(what))
}

async fn build_quote(
    ctx: &Context,
    amount: &str,
    direction: SwapDirection,
) -> Result<SwapQuote, ClientError> {
    let amount_in = ctx.parse(amount, direction.input_asset())?;
    let reserves = required(ctx.queries.reserves().await, "reserves")?;
    let fee = fee_bps_or(
        ctx.queries.swap_fee().await.fresh_value().copied(),
        ctx.config.trading.fallback_swap_fee_bps,
    )?;
    Ok(quote_swap(amount_in, direction, &reserves, fee, ctx.slippage_bps)?)
}

async fn show_quote(ctx: &Context, amount: &str, direction: SwapDirection) -> Result<(), ClientError> {
    let quote = build_quote(ctx, amount, direction).await?;
    let reserves = required(ctx.queries.reserves().await, "reserves")?;
    let (reserve_in, reserve_out) = direction.reserves(&reserves);
    let remote = ctx
        .queries
        .remote_amount_out(quote.amount_in.units(), reserve_in, reserve_out)
        .await;

    print_json(&json!({
        "direction": quote.direction,
        "amount_in": quote.amount_in.to_display(&ctx.assets),
        "amount_out": quote.amount_out.to_display(&ctx.assets),
        "min_amount_out": quote.min_amount_out.to_display(&ctx.assets),
        "fee_bps": quote.fee_bps,
        "slippage_bps": quote.slippage_bps,
        "execution_price": quote.execution_price(&ctx.assets),
        "pool_amount_out": remote.value.map(|units| {
            BaseAmount::from_units(direction.output_asset(), units).to_display(&ctx.assets)
        }),
    }));
    Ok(())
}

async fn show_pool(ctx: &Context) -> Result<(), ClientError> {
    let reserves = ctx.queries.reserves().await;
    let supply = ctx.queries.lp_total_supply().await;
    let fee = ctx.queries.swap_fee().await;
    let trading = ctx.queries.trading_enabled().await;
    let lp_balance = ctx.queries.token_balance(AssetId::Lp, ctx.account).await;

    let share = match (lp_balance.value, supply.value) {
        (Some(balance), Some(total)) => Some(pool_share_percent(balance, total)),
        _ => None,
    };

    print_json(&json!({
        "stats": reserves.value.as_ref().map(|r| pool_stats(r, &ctx.assets)),
        "reserves": reserves,
        "lp_total_supply": supply,
        "swap_fee_bps": fee,
        "trading_enabled": trading,
        "lp_balance": lp_balance,
        "pool_share_percent": share,
    }));
    Ok(())
}

async fn show_stakes(ctx: &Context, program: StakingProgram, index: u64) -> Result<(), ClientError> {
    ctx.require_liquid_staking(program)?;
    let now = unix_now();
    let aprs = ctx.queries.staking_aprs(program).await;

    let positions = match program {
        StakingProgram::Tiered => {
            let stakes = ctx.queries.stakes(ctx.account).await;
            stakes
                .value
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(i, stake)| (i as u64, stake))
                .collect::<Vec<_>>()
        }
        StakingProgram::Liquid => ctx
            .queries
            .liquid_stake(ctx.account, index)
            .await
            .value
            .map(|stake| vec![(index, stake)])
            .unwrap_or_default(),
    };

    // Ledger-computed rewards, one read per position, issued together.
    let rewards = join_all(
        positions
            .iter()
            .map(|(i, _)| ctx.queries.pending_reward(program, ctx.account, *i)),
    )
    .await;

    let mut rows = Vec::with_capacity(positions.len());
    for ((i, stake), reward) in positions.into_iter().zip(rewards) {
        rows.push(json!({
            "index": i,
            "principal": BaseAmount::from_units(AssetId::Blx, stake.principal).to_display(&ctx.assets),
            "apr_bps": stake.apr_bps,
            "lock": lock_remaining(stake.unlock_at(), now).to_string(),
            "withdrawable": stake_withdrawable(&stake, now),
            "withdrawn": stake.withdrawn,
            "pending_reward": reward.value.map(|units| {
                BaseAmount::from_units(AssetId::Blx, units).to_display(&ctx.assets)
            }),
            "pending_reward_estimate": pending_reward_estimate(&stake, now)
                .ok()
                .map(|units| BaseAmount::from_units(AssetId::Blx, units).to_display(&ctx.assets)),
        }));
    }

    let tiers: Vec<_> = StakeLock::ALL
        .iter()
        .map(|lock| {
            json!({
                "lock": lock.to_string(),
                "apr_bps": lock.apr_bps(aprs.fresh_value()),
            })
        })
        .collect();

    let totals = match program {
        StakingProgram::Liquid => Some(ctx.queries.liquid_totals().await),
        StakingProgram::Tiered => None,
    };

    print_json(&json!({
        "program": program,
        "tiers": tiers,
        "positions": rows,
        "liquid_totals": totals,
    }));
    Ok(())
}

async fn show_vault(ctx: &Context) -> Result<(), ClientError> {
    let now = unix_now();
    let deposits = ctx.queries.vault_deposits(ctx.account).await;

    let entries = deposits.value.clone().unwrap_or_default();
    let splits = join_all(
        (0..entries.len() as u64).map(|index| ctx.queries.withdrawal_split(ctx.account, index)),
    )
    .await;

    let mut rows = Vec::with_capacity(entries.len());
    for ((i, deposit), split) in entries.into_iter().enumerate().zip(splits) {
        let index = i as u64;
        let preview = withdrawal_preview(&deposit, split.value, now);
        rows.push(json!({
            "index": index,
            "principal": BaseAmount::from_units(AssetId::Blx, deposit.principal).to_display(&ctx.assets),
            "auto_stake": deposit.auto_stake,
            "withdrawn": deposit.withdrawn,
            "lock": lock_remaining(deposit.lock_until, now).to_string(),
            "preview": preview,
        }));
    }

    print_json(&json!({
        "deposits": rows,
        "deposit_count": ctx.queries.vault_deposit_count(ctx.account).await,
        "user_balance": ctx.queries.vault_user_balance(ctx.account).await,
        "totals": ctx.queries.vault_totals().await,
        "lock_periods": ctx.queries.vault_lock_periods().await,
        "error": deposits.error,
    }));
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
    }
}
