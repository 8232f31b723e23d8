use clap::{Parser, Subcommand};
use neutron_common::Address;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "neutron")]
#[command(about = "Neutron capped-supply ledger and faucet", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "neutron.toml")]
    pub config: PathBuf,

    /// Path to the data directory
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Miner credited with block rewards (overrides config)
    #[arg(long, env = "NEUTRON_MINER")]
    pub miner: Option<Address>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the ledger; half of the cap is minted to the deployer
    DeployToken {
        #[arg(long)]
        from: Address,
        /// Supply cap in whole tokens (defaults to config)
        #[arg(long)]
        cap: Option<u64>,
        /// Block reward in whole tokens (defaults to config)
        #[arg(long)]
        reward: Option<u64>,
    },
    /// Deploy the faucet against the ledger
    DeployFaucet {
        #[arg(long)]
        from: Address,
        /// Amount dispensed per request, in scaled units (defaults to config)
        #[arg(long)]
        amount: Option<u64>,
    },
    /// Transfer scaled units to another account
    Transfer {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: u128,
    },
    /// Burn scaled units from the caller's balance
    Burn {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        amount: u128,
    },
    /// Change the block reward (owner only), in whole tokens
    SetReward {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        reward: u128,
    },
    /// Show the balance of an account
    Balance { address: Address },
    /// Show supply, cap and block reward
    Supply,
    /// Request tokens from the faucet
    Request {
        #[arg(long)]
        from: Address,
    },
    /// Move tokens from the owner into the faucet (owner only)
    AddTokens {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        amount: u128,
    },
    /// Change the faucet allowance (owner only)
    SetAllowed {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        amount: u128,
    },
    /// Change the faucet cooldown (owner only)
    SetLocktime {
        #[arg(long)]
        from: Address,
        #[arg(long)]
        secs: u64,
    },
    /// Return the whole faucet balance to the owner (owner only)
    Withdraw {
        #[arg(long)]
        from: Address,
    },
    /// Show faucet configuration, balance and optionally a requester's state
    FaucetStatus { address: Option<Address> },
    /// Print the event log as JSON lines
    Events {
        #[arg(long, default_value_t = 0)]
        since: usize,
    },
}
