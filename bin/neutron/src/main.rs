mod cli;
mod config_loader;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Commands;
use neutron_common::config::NeutronConfig;
use neutron_common::types::format_units;
use neutron_common::utils::logging::init_logging;
use neutron_common::{Address, CallContext, Timestamp};
use neutron_storage::{Runtime, StateStore};
use tracing::{debug, info};

fn main() -> Result<()> {
    // 1. Parse CLI
    let args = cli::Cli::parse();

    // 2. Load Config
    let mut config =
        config_loader::load_neutron_config(&args.config, args.data_dir.clone(), args.miner)?;
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    // 3. Setup Logging
    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    debug!("Loaded config from {:?}", args.config);

    // 4. Open state
    let store = StateStore::open(&config.chain.data_dir).with_context(|| {
        format!("Failed to open state at {}", config.chain.data_dir.display())
    })?;
    let mut runtime = Runtime::with_store(store)?;

    // 5. Execute
    let now = current_time()?;
    run(&mut runtime, &config, args.command, now)
}

fn current_time() -> Result<Timestamp> {
    let secs = chrono::Utc::now().timestamp();
    Timestamp::try_from(secs).context("System clock is before the Unix epoch")
}

fn run(runtime: &mut Runtime, config: &NeutronConfig, command: Commands, now: Timestamp) -> Result<()> {
    let ctx = |caller: Address| CallContext::new(caller, config.chain.miner, now);

    match command {
        Commands::DeployToken { from, cap, reward } => {
            let cap = cap.unwrap_or(config.token.cap);
            let reward = reward.unwrap_or(config.token.reward);
            let address = runtime.deploy_token(&ctx(from), cap.into(), reward.into())?;
            info!("Token deployed at {}", address);
            println!("{}", address);
        }
        Commands::DeployFaucet { from, amount } => {
            let amount = amount.unwrap_or(config.faucet.amount_allowed);
            let address = runtime.deploy_faucet(
                &ctx(from),
                amount.into(),
                Some(config.faucet.locktime_secs),
            )?;
            info!("Faucet deployed at {}", address);
            println!("{}", address);
        }
        Commands::Transfer { from, to, amount } => {
            runtime.transfer(&ctx(from), to, amount)?;
        }
        Commands::Burn { from, amount } => {
            runtime.burn(&ctx(from), amount)?;
        }
        Commands::SetReward { from, reward } => {
            runtime.set_reward(&ctx(from), reward)?;
        }
        Commands::Balance { address } => {
            let balance = runtime.balance_of(&address)?;
            println!("{} ({} NTRO)", balance, format_units(balance));
        }
        Commands::Supply => {
            let ledger = runtime.ledger()?;
            println!("name:         {} ({})", ledger.name(), ledger.symbol());
            println!("total supply: {}", format_units(ledger.total_supply()));
            println!("cap:          {}", format_units(ledger.cap()));
            println!("block reward: {}", format_units(ledger.block_reward()));
            println!("owner:        {}", ledger.owner());
        }
        Commands::Request { from } => {
            runtime.request_tokens(&ctx(from))?;
        }
        Commands::AddTokens { from, amount } => {
            runtime.add_tokens(&ctx(from), amount)?;
        }
        Commands::SetAllowed { from, amount } => {
            runtime.change_allowed_amount(&ctx(from), amount)?;
        }
        Commands::SetLocktime { from, secs } => {
            runtime.set_locktime(&ctx(from), secs)?;
        }
        Commands::Withdraw { from } => {
            let amount = runtime.withdraw_all_tokens(&ctx(from))?;
            println!("{}", amount);
        }
        Commands::FaucetStatus { address } => {
            let faucet = runtime.faucet()?;
            println!("address:        {}", faucet.address());
            println!("owner:          {}", faucet.owner());
            println!("balance:        {}", runtime.faucet_balance()?);
            println!("amount allowed: {}", faucet.amount_allowed());
            println!("locktime:       {}s", faucet.locktime());
            if let Some(address) = address {
                println!("{}: {:?}", address, runtime.requester_state(&address, now)?);
            }
        }
        Commands::Events { since } => {
            for event in runtime.events().since(since) {
                println!("{}", serde_json::to_string(event)?);
            }
        }
    }

    Ok(())
}
