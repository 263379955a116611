//! attest - compute and check canonical hashes of bridge vote records

use std::fs;
use std::io::Read;

use bridge_attestation::config::{LogFormat, LoggingConfig};
use bridge_attestation::{
    encode_native_address, module_address, AdmissionPolicy, Config, EventFamily, InboundEvent,
    OutboundEvent, VoteRecord,
};
use clap::{Parser, Subcommand, ValueEnum};
use eyre::{Result, WrapErr};
use serde_json::json;

#[derive(Parser)]
#[command(name = "attest")]
#[command(about = "Canonical hashing and admission checks for bridge vote records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Family {
    Outbound,
    Inbound,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical hash of a vote record's event
    Hash {
        /// Vote record JSON file (or stdin if not provided)
        input: Option<String>,
        /// Event family the record carries
        #[arg(long, value_enum, default_value_t = Family::Outbound)]
        family: Family,
    },
    /// Decode and validate a vote record
    Validate {
        /// Vote record JSON file (or stdin if not provided)
        input: Option<String>,
        /// Event family the record carries
        #[arg(long, value_enum, default_value_t = Family::Outbound)]
        family: Family,
    },
    /// Print the bech32 address derived for a module account
    ModuleAddress {
        /// Module name (defaults to the configured treasury module)
        name: Option<String>,
        /// Bech32 prefix (defaults to the configured account prefix)
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = Config::load()?;
    init_logging(&config.logging);
    let policy = config.admission.policy();

    match cli.command {
        Commands::Hash { input, family } => {
            let bytes = read_input(input.as_deref())?;
            let output = match family {
                Family::Outbound => hash_record::<OutboundEvent>(&bytes)?,
                Family::Inbound => hash_record::<InboundEvent>(&bytes)?,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Validate { input, family } => {
            let bytes = read_input(input.as_deref())?;
            let (valid, output) = match family {
                Family::Outbound => validate_record::<OutboundEvent>(&bytes, &policy)?,
                Family::Inbound => validate_record::<InboundEvent>(&bytes, &policy)?,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::ModuleAddress { name, prefix } => {
            let name = name.unwrap_or_else(|| config.treasury.module_name.clone());
            let prefix = prefix.unwrap_or_else(|| config.admission.account_prefix.clone());
            let address = encode_native_address(&module_address(&name), &prefix)
                .wrap_err("failed to encode module address")?;
            println!("{}", address);
        }
    }

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).wrap_err_with(|| format!("failed to read {}", path)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn hash_record<E: EventFamily>(bytes: &[u8]) -> Result<serde_json::Value> {
    let record = VoteRecord::<E>::decode(bytes).wrap_err("failed to decode vote record")?;
    Ok(json!({
        "chain_id": record.chain_id,
        "nonce": record.nonce,
        "event_type": record.event_type(),
        "hash": record.hash(),
    }))
}

fn validate_record<E: EventFamily>(
    bytes: &[u8],
    policy: &AdmissionPolicy,
) -> Result<(bool, serde_json::Value)> {
    let record = VoteRecord::<E>::decode(bytes).wrap_err("failed to decode vote record")?;
    let output = match record.validate_with(policy) {
        Ok(()) => (
            true,
            json!({
                "valid": true,
                "event_type": record.event_type(),
                "key": record.key(),
            }),
        ),
        Err(e) => (
            false,
            json!({
                "valid": false,
                "event_type": record.event_type(),
                "field": e.field(),
                "error": e.to_string(),
            }),
        ),
    };
    Ok(output)
}

/// Initialize tracing/logging on stderr so stdout stays machine-readable
fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bridge_attestation=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}
