//! Trace Transcoder CLI
//!
//! Builds call trees from capture events and serves them in the
//! flat Parity-style trace format.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_transcoder::commands::{
    display_version, execute_build, execute_flatten, execute_raw_transaction,
    execute_replay_transaction, validate_build_args, validate_flatten_args,
    validate_raw_transaction_args, validate_replay_args, BuildArgs, FlattenArgs,
    RawTransactionArgs, ReplayArgs,
};
use trace_transcoder::utils::config::{DEFAULT_RPC_URL, DEFAULT_VM_TRACER};

/// Trace Transcoder - Parity-style traces from debug call trees
#[derive(Parser, Debug)]
#[command(name = "trace-transcoder")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a signed transaction and print its flat trace
    RawTransaction {
        /// RPC endpoint URL
        #[arg(short, long, env = "TRACE_RPC_URL", default_value = DEFAULT_RPC_URL)]
        rpc: String,

        /// Signed transaction, hex encoded
        #[arg(short, long)]
        tx: String,

        /// Requested trace kinds
        #[arg(long, value_delimiter = ',', default_value = "trace")]
        tracers: Vec<String>,

        /// Keep zero-value precompile calls
        #[arg(long)]
        keep_precompiles: bool,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a mined transaction and print its VM trace
    ReplayTransaction {
        /// RPC endpoint URL
        #[arg(short, long, env = "TRACE_RPC_URL", default_value = DEFAULT_RPC_URL)]
        rpc: String,

        /// Transaction hash to replay
        #[arg(short, long)]
        tx: String,

        /// Requested trace kinds
        #[arg(long, value_delimiter = ',', default_value = "vmTrace")]
        tracers: Vec<String>,

        /// Op recorder registered on the node
        #[arg(long, default_value = DEFAULT_VM_TRACER)]
        vm_tracer: String,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transcode a debug-style call trace file to the flat format
    Flatten {
        /// Path to the call tracer JSON document
        #[arg(short, long)]
        input: PathBuf,

        /// Override the `type` written on every entry
        #[arg(long)]
        trace_type: Option<String>,

        /// Keep zero-value precompile calls
        #[arg(long)]
        keep_precompiles: bool,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rebuild a call tree from a recorded capture event log
    Build {
        /// Path to the JSON event log
        #[arg(short, long)]
        events: PathBuf,

        /// Print the nested call tree instead of the flat trace
        #[arg(long)]
        nested: bool,

        /// Keep zero-value precompile calls
        #[arg(long)]
        keep_precompiles: bool,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging on stderr so stdout stays valid JSON
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::RawTransaction {
            rpc,
            tx,
            tracers,
            keep_precompiles,
            output,
        } => {
            let args = RawTransactionArgs {
                rpc_url: rpc,
                raw_transaction: tx,
                tracers,
                keep_precompiles,
                output,
            };

            validate_raw_transaction_args(&args)?;
            execute_raw_transaction(args)?;
        }

        Commands::ReplayTransaction {
            rpc,
            tx,
            tracers,
            vm_tracer,
            output,
        } => {
            let args = ReplayArgs {
                rpc_url: rpc,
                transaction_hash: tx,
                tracers,
                vm_tracer,
                output,
            };

            validate_replay_args(&args)?;
            execute_replay_transaction(args)?;
        }

        Commands::Flatten {
            input,
            trace_type,
            keep_precompiles,
            output,
        } => {
            let args = FlattenArgs {
                input,
                trace_type,
                keep_precompiles,
                output,
            };

            validate_flatten_args(&args)?;
            execute_flatten(args)?;
        }

        Commands::Build {
            events,
            nested,
            keep_precompiles,
            output,
        } => {
            let args = BuildArgs {
                events,
                nested,
                keep_precompiles,
                output,
            };

            validate_build_args(&args)?;
            execute_build(args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
