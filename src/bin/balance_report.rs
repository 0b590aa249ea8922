use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utxo_tracker::history::{HistoryClient, HistoryConfig};
use utxo_tracker::reconstruct::reconstruct;
use utxo_tracker::select::{InputSelectionAlgorithm, LargestFirst, PaymentPolicy};
use utxo_tracker::types::{Address, Value};

const SATOSHIS_PER_COIN: f64 = 100_000_000.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendRequest {
    amount: u64,
    fee: u64,
    #[serde(default)]
    min_payment: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    address: String,
    history: HistoryConfig,
    #[serde(default)]
    send: Option<SendRequest>,
}

#[derive(Parser, Debug)]
#[clap(version)]
pub struct Cli {
    /// path to config file
    #[clap(long, value_parser)]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let result = _main().await;
    result.unwrap();
}

async fn _main() -> anyhow::Result<()> {
    // Start logging setup block
    let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();

    tracing_subscriber::registry().with(fmt_layer).init();

    let Cli { config_path } = Cli::parse();

    tracing::info!("Config file {:?}", config_path);
    let file = File::open(&config_path).with_context(|| {
        format!(
            "Cannot read config file {path}",
            path = config_path.display()
        )
    })?;
    let config: Config = serde_yaml::from_reader(file).with_context(|| {
        format!(
            "Cannot read config file {path}",
            path = config_path.display()
        )
    })?;

    let address = Address::new(config.address.clone());
    let client = HistoryClient::new(config.history)?;
    let history = client.fetch_history(&address).await?;

    let (_, snapshot) = reconstruct(&address, &history)?;

    tracing::info!(
        "incoming: {} confirmed / {} pending",
        format_coins(snapshot.incoming_confirmed),
        format_coins(snapshot.incoming_pending)
    );
    tracing::info!(
        "outgoing: {} confirmed / {} pending",
        format_coins(snapshot.outgoing_confirmed),
        format_coins(snapshot.outgoing_pending)
    );
    tracing::info!(
        "available balance: {} ({} unspent outputs)",
        format_coins(snapshot.available_balance),
        snapshot.unspent_entries.len()
    );

    if let Some(send) = config.send {
        let policy = match send.min_payment {
            Some(min_payment) => PaymentPolicy {
                min_payment: Value::from(min_payment),
            },
            None => PaymentPolicy::default(),
        };
        let amount = Value::from(send.amount);
        let fee = Value::from(send.fee);
        policy.validate_request(amount)?;

        let plan = LargestFirst.select(&snapshot.unspent_entries, amount, fee)?;
        for input in plan.inputs.iter() {
            tracing::info!("selected input {} worth {}", input.pointer, input.value);
        }
        tracing::info!(
            "plan: {} inputs totalling {}, change {}",
            plan.inputs.len(),
            format_coins(plan.total_input_value),
            format_coins(plan.change)
        );
    }

    Ok(())
}

fn format_coins(value: Value) -> String {
    format!("{:.8}", value.as_satoshis() as f64 / SATOSHIS_PER_COIN)
}
