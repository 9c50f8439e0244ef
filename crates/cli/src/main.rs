use std::{path::PathBuf, str::FromStr, sync::Arc};

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use clap::{Args, Parser, Subcommand};
use eyre::{WrapErr, eyre};

use sealbid_cli::{
    DEFAULT_CONFIG_PATH, PRIVATE_KEY_ENV,
    commands::{
        action::{self, Action},
        status as status_cmd, watch as watch_cmd,
    },
    init_logging, load_config,
};

#[derive(Debug, Parser)]
#[command(name = "sealbid-cli", about = "Sealed-bid auction CLI", version)]
struct Cli {
    /// Path to the network configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: PathBuf,

    /// RPC URL, overrides `rpc_url` from the config file
    #[arg(long, env = "SEALBID_RPC_URL", value_name = "URL")]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll the auction once and print it
    Status(ViewArgs),

    /// Print the auction every poll period until Ctrl-C
    Watch(ViewArgs),

    /// Cancel this account's bid
    CancelBid(KeyArgs),

    /// Withdraw this account's pending refund
    ClaimRefund(KeyArgs),

    /// Request finalization of an ended round
    Finalize(KeyArgs),
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Include bidder details for this account
    #[arg(long, value_name = "ADDRESS")]
    account: Option<Address>,
}

#[derive(Debug, Args)]
struct KeyArgs {
    /// Hex private key of the sending account
    #[arg(long, env = PRIVATE_KEY_ENV, hide_env_values = true)]
    private_key: String,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let file = load_config(&cli.config)?;
    let config = Arc::new(file.network_config()?);
    let rpc_url = cli
        .rpc_url
        .or_else(|| file.network.rpc_url.clone())
        .ok_or_else(|| eyre!("no rpc url: pass --rpc-url or set `rpc_url`"))?;

    match cli.command {
        Commands::Status(args) => {
            let provider = ProviderBuilder::new().connect(&rpc_url).await?.erased();
            let view = status_cmd::status(provider, config, args.account).await?;
            print!("{}", status_cmd::render(&view));
        }
        Commands::Watch(args) => {
            let provider = ProviderBuilder::new().connect(&rpc_url).await?.erased();
            watch_cmd::watch(provider, config, args.account).await?;
        }
        Commands::CancelBid(key) => send(&rpc_url, key, config, Action::CancelBid).await?,
        Commands::ClaimRefund(key) => send(&rpc_url, key, config, Action::ClaimRefund).await?,
        Commands::Finalize(key) => send(&rpc_url, key, config, Action::Finalize).await?,
    }

    Ok(())
}

async fn send(
    rpc_url: &str,
    key: KeyArgs,
    config: Arc<sealbid_core::NetworkConfig>,
    action: Action,
) -> eyre::Result<()> {
    let raw_key = key.private_key.trim();
    let signer = PrivateKeySigner::from_str(raw_key).wrap_err("invalid private key")?;
    let provider: DynProvider = ProviderBuilder::new()
        .wallet(signer.clone())
        .connect(rpc_url)
        .await?
        .erased();

    let tx_hash = action::run(provider, signer, config, action).await?;
    println!("{action:?} confirmed in {tx_hash}");
    Ok(())
}
