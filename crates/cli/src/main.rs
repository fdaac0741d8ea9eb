use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use launchpad::{
    controller_salt, create_example_config, guard_salt, AddressDeterminism, AssetMinter,
    LaunchpadConfig,
};
use launchpad_simulation::{MockChain, SaltMiner, ScenarioRunner, DEFAULT_MAX_ATTEMPTS};
use launchpad_types::Hash;

#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(about = "Feels launchpad tooling: salts, address prediction and simulated launches")]
struct Args {
    /// Path to launchpad configuration file; defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind a salt to a chain id
    GuardSalt {
        /// Base58 salt
        salt: String,

        /// Chain id; the configured one when omitted
        #[arg(long)]
        chain_id: Option<u64>,
    },

    /// Predict the asset and controller addresses for a salt on the simulated deployer
    Predict {
        /// Base58 salt
        salt: String,
    },

    /// Search for a salt whose asset address carries the reserved prefix
    MineSalt {
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u64,

        /// Seed for a reproducible search
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write an example configuration file
    InitConfig {
        #[arg(short, long, default_value = "launchpad.toml")]
        output: String,
    },

    /// Replay the configured launches on a fresh simulated chain
    Simulate {
        /// Seed for reproducible salts and addresses
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    let config_path = args.config.as_deref();
    match args.command {
        Command::InitConfig { output } => {
            create_example_config(&output)
                .with_context(|| format!("Failed to write example config to {}", output))?;
            log::info!("Example configuration written to {}", output);
        }
        Command::GuardSalt { salt, chain_id } => {
            let salt = parse_salt(&salt)?;
            let chain_id = match chain_id {
                Some(chain_id) => chain_id,
                None => load_config(config_path)?.chain_id,
            };
            println!("{}", guard_salt(chain_id, &salt));
        }
        Command::Predict { salt } => {
            let salt = parse_salt(&salt)?;
            let config = load_config(config_path)?;
            let chain = MockChain::new(config.chain_id);
            let minter = AssetMinter::new(config.minter.clone());

            let asset = minter.predict_asset_address(&chain, config.chain_id, &salt);
            let controller = AddressDeterminism::new(config.chain_id)
                .predict_for_salt(&chain, &controller_salt(&asset));
            let output = serde_json::json!({
                "chain_id": config.chain_id,
                "asset": asset.to_string(),
                "reserved_prefix": minter.has_reserved_prefix(&asset),
                "controller": controller.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::MineSalt { max_attempts, seed } => {
            let config = load_config(config_path)?;
            let chain = MockChain::new(config.chain_id);
            let minter = AssetMinter::new(config.minter.clone());
            let mut miner = match seed {
                Some(seed) => SaltMiner::seeded(seed, max_attempts),
                None => SaltMiner::new(max_attempts),
            };

            let mined = miner.mine(&minter, &chain, config.chain_id)?;
            log::info!("Found salt after {} attempts", mined.attempts);
            println!("{}", serde_json::to_string_pretty(&mined)?);
        }
        Command::Simulate { seed } => {
            let config = load_config(config_path)?;
            log::info!(
                "Simulating {} launches on chain {}",
                config.scenario.launches.len(),
                config.chain_id
            );
            let mut runner = ScenarioRunner::new(config, seed)?;
            let report = runner.run()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<LaunchpadConfig> {
    let config = match path {
        Some(path) => {
            let config = LaunchpadConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path))?;
            log::info!("Loaded configuration from {}", path);
            config
        }
        None => {
            log::debug!("No config given, using defaults");
            LaunchpadConfig::default()
        }
    };
    Ok(config)
}

fn parse_salt(salt: &str) -> Result<Hash> {
    if salt.is_empty() {
        bail!("Salt must not be empty");
    }
    Hash::from_str(salt).with_context(|| format!("Invalid base58 salt: {}", salt))
}
