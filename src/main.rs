//! Multisig ledger CLI application
//!
//! Deploys a ledger, drives the propose/confirm/execute flow from the command
//! line and serves the same operations over HTTP.

use clap::{Parser, Subcommand};
use multisig_ledger::api::{create_router, ApiState};
use multisig_ledger::cli::{self, AppState};
use multisig_ledger::ledger::LedgerConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig")]
#[command(version = "0.1.0")]
#[command(about = "An M-of-N multisignature custody ledger", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".multisig_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a new ledger
    Deploy {
        /// Owner identity (repeat for each owner)
        #[arg(short, long = "owner")]
        owners: Vec<String>,

        /// Confirmations required to execute
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Optional human readable label
        #[arg(short, long)]
        label: Option<String>,

        /// JSON deployment file, used instead of the flags above
        #[arg(short, long, conflicts_with_all = ["owners", "threshold", "label"])]
        config: Option<PathBuf>,

        /// Replace an existing deployment
        #[arg(long)]
        force: bool,
    },

    /// Fund the custodial account
    Deposit {
        /// Sender identity
        #[arg(short, long)]
        from: String,

        /// Amount in ether (e.g. 0.5)
        #[arg(short, long)]
        amount: String,
    },

    /// Propose a transfer out of the custodial account
    Propose {
        /// Proposing owner
        #[arg(short, long)]
        caller: String,

        /// Destination account
        #[arg(short, long)]
        to: String,

        /// Amount in ether
        #[arg(short, long)]
        value: String,

        /// Hex call data passed to the destination
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Confirm a pending transaction
    Confirm {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        index: usize,
    },

    /// Withdraw a confirmation
    Revoke {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        index: usize,
    },

    /// Execute a transaction that reached the threshold
    Execute {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        index: usize,
    },

    /// Display ledger information
    Info,

    /// Show one transaction
    Tx {
        #[arg(short, long)]
        index: usize,
    },

    /// List all transactions
    List,

    /// Show the balance of an account
    Balance {
        #[arg(short, long)]
        address: String,
    },

    /// List funded accounts in the custody book
    Accounts,

    /// Show saved backups
    Backups,

    /// Roll back to a saved backup
    Restore {
        /// Backup number (0 is the most recent)
        #[arg(short, long)]
        backup: usize,
    },

    /// Export the ledger to a file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a ledger from a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Deploy runs before any ledger exists
    if let Commands::Deploy {
        owners,
        threshold,
        label,
        config,
        force,
    } = cli.command
    {
        let config = match config {
            Some(path) => cli::load_deploy_config(&path)?,
            None => {
                let threshold = threshold.ok_or("--threshold is required without --config")?;
                LedgerConfig::new(owners, threshold, label)?
            }
        };
        return cli::cmd_deploy(&cli.data_dir, config, force);
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Deploy { .. } => unreachable!(),

        Commands::Deposit { from, amount } => {
            cli::cmd_deposit(&mut state, &from, &amount)?;
        }

        Commands::Propose {
            caller,
            to,
            value,
            data,
        } => {
            cli::cmd_propose(&mut state, &caller, &to, &value, data.as_deref())?;
        }

        Commands::Confirm { caller, index } => {
            cli::cmd_confirm(&mut state, &caller, index)?;
        }

        Commands::Revoke { caller, index } => {
            cli::cmd_revoke(&mut state, &caller, index)?;
        }

        Commands::Execute { caller, index } => {
            cli::cmd_execute(&mut state, &caller, index)?;
        }

        Commands::Info => {
            cli::cmd_info(&state)?;
        }

        Commands::Tx { index } => {
            cli::cmd_tx(&state, index)?;
        }

        Commands::List => {
            cli::cmd_list(&state)?;
        }

        Commands::Balance { address } => {
            cli::cmd_balance(&state, &address)?;
        }

        Commands::Accounts => {
            cli::cmd_accounts(&state)?;
        }

        Commands::Backups => {
            cli::cmd_backups(&state)?;
        }

        Commands::Restore { backup } => {
            cli::cmd_restore(&mut state, backup)?;
        }

        Commands::Export { output } => {
            cli::cmd_export(&state, &output)?;
        }

        Commands::Import { input } => {
            cli::cmd_import(&mut state, &input)?;
        }

        Commands::Serve { port } => {
            run_server(state, port)?;
        }
    }

    Ok(())
}

/// Serve the loaded ledger over HTTP until interrupted
fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let AppState { ledger, storage, .. } = state;
        println!("📂 Loaded ledger {}", ledger.address());

        let api_state = ApiState::new(ledger, storage);
        let shutdown_state = api_state.clone();
        let app = create_router(api_state);

        let addr = format!("0.0.0.0:{}", port);
        println!("🚀 REST API server starting on http://localhost:{}", port);
        println!();
        println!("📖 Available endpoints:");
        println!("   GET  /health                               - Health check");
        println!("   GET  /ws                                   - WebSocket events");
        println!("   GET  /api/ledger                           - Ledger info");
        println!("   GET  /api/ledger/balance/{{address}}         - Account balance");
        println!("   POST /api/ledger/deposit                   - Deposit funds");
        println!("   GET  /api/transactions                     - List transactions");
        println!("   POST /api/transactions                     - Propose transaction");
        println!("   GET  /api/transactions/{{index}}             - Get transaction");
        println!("   POST /api/transactions/{{index}}/confirm     - Confirm");
        println!("   POST /api/transactions/{{index}}/revoke      - Revoke confirmation");
        println!("   POST /api/transactions/{{index}}/execute     - Execute");
        println!();

        // Save on Ctrl+C before exiting
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!("\n📴 Shutting down API server...");

            let ledger = shutdown_state.ledger.read().await;
            match shutdown_state.storage.save(&ledger) {
                Ok(()) => println!("✅ Ledger saved"),
                Err(e) => log::error!("Failed to save ledger on shutdown: {}", e),
            }
            std::process::exit(0);
        });

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
