//! CLI commands for the ledger
//!
//! Implements all command handlers for the CLI interface. Every mutating
//! command loads the saved ledger, applies one operation and saves it.

use crate::custody::{format_ether, parse_ether, Bank, Custodian};
use crate::ledger::{LedgerConfig, MultisigLedger, TransactionStatus};
use crate::storage::{Storage, StorageConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub ledger: MultisigLedger,
    pub storage: Storage,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load the deployed ledger from the data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        })?;

        if !storage.exists() {
            return Err(format!(
                "no ledger deployed in {:?}; run `multisig deploy` first",
                data_dir
            )
            .into());
        }

        let ledger = storage.load()?;

        Ok(Self {
            ledger,
            storage,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.ledger)?;
        Ok(())
    }
}

/// Read a deployment file (`{"owners": [...], "threshold": 2, "label": "..."}`)
pub fn load_deploy_config(path: &Path) -> CliResult<LedgerConfig> {
    let data = fs::read_to_string(path)?;
    let config: LedgerConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
}

/// Decode optional hex call data, accepting a `0x` prefix
pub fn parse_data(data: Option<&str>) -> CliResult<Vec<u8>> {
    match data {
        None => Ok(Vec::new()),
        Some(hex_str) => {
            let trimmed = hex_str.trim_start_matches("0x");
            Ok(hex::decode(trimmed)?)
        }
    }
}

/// Deploy a new ledger
pub fn cmd_deploy(data_dir: &Path, config: LedgerConfig, force: bool) -> CliResult<()> {
    let storage = Storage::new(StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    })?;

    if storage.exists() && !force {
        println!("⚠️  A ledger is already deployed at {:?}", data_dir);
        println!("   Use --force to redeploy (this will discard existing data)");
        return Ok(());
    }

    let ledger = MultisigLedger::new(config, Bank::new())?;
    storage.save(&ledger)?;

    println!("✅ Ledger deployed!");
    println!("   📍 Address: {}", ledger.address());
    println!("   🔐 Policy: {}", ledger.description());
    for (i, owner) in ledger.owners().iter().enumerate() {
        println!("   👤 Owner {}: {}", i + 1, owner);
    }
    if let Some(label) = ledger.label() {
        println!("   🏷️  Label: {}", label);
    }

    Ok(())
}

/// Fund the custodial account
pub fn cmd_deposit(state: &mut AppState, from: &str, amount: &str) -> CliResult<()> {
    let amount = parse_ether(amount)?;
    let balance = state.ledger.deposit(from, amount)?;
    state.save()?;

    println!("💰 Deposited {} from {}", format_ether(amount), from);
    println!("   Ledger balance: {}", format_ether(balance));

    Ok(())
}

/// Propose a transfer
pub fn cmd_propose(
    state: &mut AppState,
    caller: &str,
    to: &str,
    value: &str,
    data: Option<&str>,
) -> CliResult<()> {
    let value = parse_ether(value)?;
    let data = parse_data(data)?;

    let index = state.ledger.propose(caller, to, value, data)?;
    state.save()?;

    println!("📝 Transaction {} proposed", index);
    println!("   To: {}", to);
    println!("   Value: {}", format_ether(value));
    println!(
        "   Needs {} confirmation(s) before execution",
        state.ledger.threshold()
    );

    Ok(())
}

/// Confirm a transaction
pub fn cmd_confirm(state: &mut AppState, caller: &str, index: usize) -> CliResult<()> {
    state.ledger.confirm(caller, index)?;
    state.save()?;

    let info = state.ledger.transaction_info(index)?;
    println!("✅ Transaction {} confirmed by {}", index, caller);
    println!(
        "   Confirmations: {}/{}",
        info.confirmation_count,
        state.ledger.threshold()
    );

    Ok(())
}

/// Revoke a confirmation
pub fn cmd_revoke(state: &mut AppState, caller: &str, index: usize) -> CliResult<()> {
    state.ledger.revoke_confirmation(caller, index)?;
    state.save()?;

    let info = state.ledger.transaction_info(index)?;
    println!("↩️  Confirmation of transaction {} revoked by {}", index, caller);
    println!(
        "   Confirmations: {}/{}",
        info.confirmation_count,
        state.ledger.threshold()
    );

    Ok(())
}

/// Execute a confirmed transaction
pub fn cmd_execute(state: &mut AppState, caller: &str, index: usize) -> CliResult<()> {
    state.ledger.execute(caller, index)?;
    state.save()?;

    let info = state.ledger.transaction_info(index)?;
    println!("🚀 Transaction {} executed by {}", index, caller);
    println!("   Sent {} to {}", format_ether(info.value), info.to);
    println!("   Ledger balance: {}", format_ether(state.ledger.balance()));

    Ok(())
}

/// Display ledger info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let ledger = &state.ledger;

    println!("🔐 Ledger Info");
    println!("   ├─ Address: {}", ledger.address());
    println!("   ├─ Policy: {}", ledger.description());
    println!("   ├─ Label: {}", ledger.label().unwrap_or("-"));
    println!("   ├─ Owners: {}", ledger.owners().join(", "));
    println!("   ├─ Balance: {}", format_ether(ledger.balance()));
    println!("   ├─ Transactions: {}", ledger.transaction_count());
    println!("   ├─ Pending: {}", ledger.pending_indices().len());
    println!(
        "   └─ Deployed: {}",
        ledger.created_at().format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}

/// Show one transaction
pub fn cmd_tx(state: &AppState, index: usize) -> CliResult<()> {
    let ledger = &state.ledger;
    let tx = ledger
        .transaction(index)
        .ok_or_else(|| format!("transaction {} not found", index))?;

    println!("📄 Transaction {}", index);
    println!("   ├─ To: {}", tx.to());
    println!("   ├─ Value: {}", format_ether(tx.value()));
    println!("   ├─ Data: 0x{}", hex::encode(tx.data()));
    println!("   ├─ Proposer: {}", tx.proposer());
    println!(
        "   ├─ Confirmations: {}/{} ({})",
        tx.confirmation_count(),
        ledger.threshold(),
        tx.confirmed_by().join(", ")
    );
    println!("   ├─ Status: {:?}", tx.status(ledger.threshold()));
    match tx.executed_at() {
        Some(at) => println!("   └─ Executed: {}", at.format("%Y-%m-%d %H:%M:%S")),
        None => println!("   └─ Executed: no"),
    }

    Ok(())
}

/// List all transactions
pub fn cmd_list(state: &AppState) -> CliResult<()> {
    let ledger = &state.ledger;

    if ledger.transaction_count() == 0 {
        println!("📭 No transactions yet. Propose one with: multisig propose");
        return Ok(());
    }

    println!("📋 Transactions:");
    for (index, tx) in ledger.transactions().iter().enumerate() {
        let marker = match tx.status(ledger.threshold()) {
            TransactionStatus::AwaitingConfirmations => "⏳",
            TransactionStatus::Ready => "🟢",
            TransactionStatus::Executed => "✅",
        };
        println!(
            "   {} #{} | {} -> {} | {}/{}",
            marker,
            index,
            format_ether(tx.value()),
            tx.to(),
            tx.confirmation_count(),
            ledger.threshold()
        );
    }

    Ok(())
}

/// Balance of any account in the custody book
pub fn cmd_balance(state: &AppState, address: &str) -> CliResult<()> {
    let balance = state.ledger.custody().balance_of(address);
    println!("💰 Balance for {}: {}", address, format_ether(balance));
    Ok(())
}

/// List every funded account in the custody book
pub fn cmd_accounts(state: &AppState) -> CliResult<()> {
    let book = state.ledger.custody();
    let mut holders = book.holders();
    holders.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("🏦 Accounts:");
    for (account, balance) in holders {
        let marker = if account == state.ledger.address() {
            " (ledger)"
        } else {
            ""
        };
        println!("   {} | {}{}", format_ether(*balance), account, marker);
    }
    println!("   Total held: {}", format_ether(book.total_supply()));

    Ok(())
}

/// Show saved backups and storage usage
pub fn cmd_backups(state: &AppState) -> CliResult<()> {
    let stats = state.storage.stats()?;
    let backups = state.storage.list_backups();

    println!("💾 Storage: {:?}", stats.data_dir);
    println!("   Ledger file: {} bytes", stats.file_size);
    if backups.is_empty() {
        println!("   No backups");
        return Ok(());
    }

    for index in backups {
        let ledger = state.storage.restore_backup(index)?;
        println!(
            "   #{} | {} transaction(s) | balance {}",
            index,
            ledger.transaction_count(),
            format_ether(ledger.balance())
        );
    }

    Ok(())
}

/// Replace the current ledger with a saved backup
pub fn cmd_restore(state: &mut AppState, backup: usize) -> CliResult<()> {
    let restored = state.storage.restore_backup(backup)?;
    if restored.address() != state.ledger.address() {
        return Err(format!(
            "backup {} belongs to ledger {}, not {}",
            backup,
            restored.address(),
            state.ledger.address()
        )
        .into());
    }

    state.ledger = restored;
    state.save()?;

    println!("♻️  Restored backup {}", backup);
    println!("   Transactions: {}", state.ledger.transaction_count());

    Ok(())
}

/// Export ledger to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.ledger, path)?;
    println!("📦 Ledger exported to {:?}", path);
    Ok(())
}

/// Import ledger from file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    state.ledger = crate::storage::load_from_file(path)?;
    state.save()?;

    println!("📥 Ledger imported from {:?}", path);
    println!("   Address: {}", state.ledger.address());

    Ok(())
}
