//! Main entry point for the gateway composer toolkit.
//!
//! `composer setup` deploys a `GatewayComposer` for the owner and token pair
//! in `[setup]`. `composer request-stake` approves the composer and requests a
//! stake with the parameters in `[stake]`.

use alloy_json_abi::JsonAbi;
use clap::{Parser, Subcommand};
use composer_account::AccountService;
use composer_artifacts::ArtifactService;
use composer_config::Config;
use composer_core::{ComposerDeployer, StakePolicy, Staker};
use composer_delivery::DeliveryService;
use composer_types::{SecretString, TransactionOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line arguments for the composer toolkit.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Deploy a GatewayComposer using the [setup] section
	Setup {
		/// Gas limit for the deployment (default 7500000)
		#[arg(long)]
		gas: Option<u64>,
		/// Gas price in wei
		#[arg(long)]
		gas_price: Option<u128>,
	},
	/// Approve the composer and request a stake using the [stake] section
	RequestStake {
		/// JSON ABI of the value token; looked up in the artifacts when omitted
		#[arg(long)]
		value_token_abi: Option<PathBuf>,
		/// Gas limit for both transactions
		#[arg(long)]
		gas: Option<u64>,
		/// Gas price in wei
		#[arg(long)]
		gas_price: Option<u128>,
	},
}

/// Services shared by every command.
struct Services {
	delivery: Arc<DeliveryService>,
	artifacts: Arc<ArtifactService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		chain_id = config.chain.chain_id,
		"Loaded configuration [{}]",
		args.config.display()
	);

	let services = build_services(&config).await?;
	let block = services.delivery.get_block_number().await?;
	tracing::info!(block, rpc_url = %config.chain.rpc_url, "Connected");

	match args.command {
		Command::Setup { gas, gas_price } => {
			let setup = config
				.setup
				.as_ref()
				.ok_or("Missing [setup] section in configuration")?;
			let deployer = ComposerDeployer::new(services.delivery, services.artifacts);

			let result = deployer
				.setup(
					setup,
					TransactionOptions {
						gas,
						gas_price,
						..Default::default()
					},
				)
				.await?;

			println!("{}", serde_json::to_string_pretty(&result)?);
		},
		Command::RequestStake {
			value_token_abi,
			gas,
			gas_price,
		} => {
			let stake = config
				.stake
				.as_ref()
				.ok_or("Missing [stake] section in configuration")?;

			let abi = match value_token_abi {
				Some(path) => read_abi(&path).await?,
				None => services.artifacts.get_abi(&stake.value_token_contract).await?,
			};

			let staker = Staker::new(
				services.delivery,
				services.artifacts,
				stake.value_token,
				stake.branded_token,
				stake.gateway_composer,
			)
			.with_policy(StakePolicy {
				halt_on_failed_approval: stake.halt_on_failed_approval,
			});

			let options = TransactionOptions {
				from: Some(stake.request.owner),
				gas,
				gas_price,
				..Default::default()
			};
			let result = staker.request_stake(&abi, &stake.request, options).await?;

			println!("approve: {}", status(result.approve.success));
			println!("requestStake: {}", status(result.request_stake.success));
		},
	}

	Ok(())
}

/// Builds the chain client and artifact lookup from configuration.
///
/// Every configured account becomes a signer of the chain client, so any of
/// them can be used as a transaction sender.
async fn build_services(config: &Config) -> Result<Services, Box<dyn std::error::Error>> {
	let mut keys: Vec<SecretString> = Vec::with_capacity(config.accounts.len());
	for (name, account_config) in &config.accounts {
		let implementation = account_config
			.get("implementation")
			.and_then(|v| v.as_str())
			.unwrap_or("local");
		let factory = composer_account::factory_for(implementation)
			.ok_or_else(|| format!("Unknown account implementation '{}'", implementation))?;

		let account = AccountService::new(factory(account_config)?);
		let address = account.get_address().await?;
		tracing::info!(account = %name, address = %address, "Loaded account");
		keys.push(account.get_private_key());
	}

	let delivery_factory = composer_delivery::get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.delivery.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			format!(
				"Unknown delivery implementation '{}'",
				config.delivery.primary
			)
		})?;
	let delivery = delivery_factory(&config.delivery.primary_config(), &config.chain, &keys)?;
	let delivery = Arc::new(DeliveryService::new(
		delivery,
		config.delivery.min_confirmations,
	));

	let artifacts_config = config.artifacts.primary_config().ok_or_else(|| {
		format!(
			"Primary artifacts '{}' not found in implementations",
			config.artifacts.primary
		)
	})?;
	let artifacts = Arc::new(ArtifactService::from_config(
		&config.artifacts.primary,
		artifacts_config,
	)?);

	Ok(Services {
		delivery,
		artifacts,
	})
}

async fn read_abi(path: &Path) -> Result<JsonAbi, Box<dyn std::error::Error>> {
	let content = tokio::fs::read_to_string(path).await?;
	Ok(serde_json::from_str(&content)?)
}

fn status(success: bool) -> &'static str {
	if success {
		"success"
	} else {
		"failed"
	}
}
