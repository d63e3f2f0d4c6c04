//! schain CLI - Bridge interface for the bid-request tooling
//!
//! Commands: decode, encode, validate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on a rejected chain, 1 on bad input

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use schain_codec::{fingerprint, Codec, CodecConfig, SupplyChain};

#[derive(Parser)]
#[command(name = "schain-cli")]
#[command(about = "schain CLI - OpenRTB SupplyChain codec")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a codec config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode and validate a wire string
    Decode {
        /// Wire-format schain string
        raw: String,
    },

    /// Encode a chain to its wire string
    Encode {
        /// JSON payload (SupplyChain)
        #[arg(short, long)]
        payload: String,
    },

    /// Validate a chain and print every violation
    Validate {
        /// JSON payload (SupplyChain)
        #[arg(short, long)]
        payload: String,
    },
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to render output: {}", e),
    }
}

fn parse_chain(payload: &str) -> Result<SupplyChain, ExitCode> {
    serde_json::from_str(payload).map_err(|e| {
        print_json(&serde_json::json!({
            "success": false,
            "error": format!("Invalid payload: {}", e),
        }));
        ExitCode::FAILURE
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match CodecConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                print_json(&serde_json::json!({ "error": e.to_string() }));
                return ExitCode::FAILURE;
            }
        },
        None => CodecConfig::default(),
    };

    let codec = Codec::new(config);

    match cli.command {
        Commands::Decode { raw } => match codec.decode(&raw) {
            Ok(chain) => {
                print_json(&serde_json::json!({
                    "valid": true,
                    "fingerprint": fingerprint(&chain),
                    "chain": chain,
                }));
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_json(&serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                }));
                ExitCode::from(2)
            }
        },

        Commands::Encode { payload } => {
            let chain = match parse_chain(&payload) {
                Ok(c) => c,
                Err(code) => return code,
            };

            // External payloads are always validated.
            if let Err(violations) = codec.validator().validate(&chain) {
                print_json(&serde_json::json!({
                    "success": false,
                    "violations": violations,
                }));
                return ExitCode::from(2);
            }

            print_json(&serde_json::json!({
                "success": true,
                "schain": codec.encode(&chain),
            }));
            ExitCode::SUCCESS
        }

        Commands::Validate { payload } => {
            let chain = match parse_chain(&payload) {
                Ok(c) => c,
                Err(code) => return code,
            };

            let report = codec.validator().check(&chain);
            let valid = report.valid;
            print_json(&serde_json::json!(report));
            if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
    }
}
