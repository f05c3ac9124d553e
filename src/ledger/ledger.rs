//! The transaction ledger
//!
//! Owns the owner set, the threshold, every proposed transaction and the
//! custodial funds, and implements propose / confirm / revoke / execute.

use crate::custody::{Bank, Custodian};
use crate::events::{EventSink, LedgerEvent, Notifier};
use crate::ledger::config::{LedgerConfig, LedgerError};
use crate::ledger::transaction::{Transaction, TransactionInfo, TransactionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// M-of-N approval ledger over a custodial account
#[derive(Debug, Serialize, Deserialize)]
pub struct MultisigLedger<C = Bank> {
    /// Owners and threshold, fixed at construction
    config: LedgerConfig,
    /// Custodial account holding the funds inside `custody`
    address: String,
    /// Append-only; position is the transaction index
    transactions: Vec<Transaction>,
    /// Balance holder the ledger moves funds through
    custody: C,
    /// Deployment timestamp
    created_at: DateTime<Utc>,
    #[serde(skip)]
    notifier: Notifier,
}

/// Look up a transaction that may still change
fn pending_mut(
    transactions: &mut [Transaction],
    index: usize,
) -> Result<&mut Transaction, LedgerError> {
    let tx = transactions
        .get_mut(index)
        .ok_or(LedgerError::InvalidTransaction(index))?;
    if tx.executed() {
        return Err(LedgerError::AlreadyExecuted(index));
    }
    Ok(tx)
}

impl<C: Custodian> MultisigLedger<C> {
    /// Deploy a ledger with an empty transaction list
    pub fn new(config: LedgerConfig, custody: C) -> Result<Self, LedgerError> {
        config.validate()?;
        let address = config.address();

        log::info!(
            "Ledger deployed at {} ({}, owners: {})",
            address,
            config.description(),
            config.owners.join(", ")
        );

        Ok(Self {
            config,
            address,
            transactions: Vec::new(),
            custody,
            created_at: Utc::now(),
            notifier: Notifier::new(),
        })
    }

    /// Register a notification sink
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.notifier.subscribe(sink);
    }

    /// Number of subscribed event sinks
    pub fn sink_count(&self) -> usize {
        self.notifier.sink_count()
    }

    fn ensure_owner(&self, caller: &str) -> Result<(), LedgerError> {
        if !self.config.is_owner(caller) {
            log::debug!("Rejected call from non-owner {}", caller);
            return Err(LedgerError::NotAnOwner(caller.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Mutating operations
    // =========================================================================

    /// Credit the custodial account with funds from outside the book
    pub fn deposit(&mut self, sender: &str, amount: u128) -> Result<u128, LedgerError> {
        let balance = self.custody.credit(&self.address, amount)?;

        log::info!("Deposit of {} from {}, balance {}", amount, sender, balance);
        self.notifier.emit(LedgerEvent::Deposit {
            sender: sender.to_string(),
            amount,
            balance,
        });

        Ok(balance)
    }

    /// Propose a transfer; returns its index
    ///
    /// The proposer does not implicitly confirm.
    pub fn propose(
        &mut self,
        caller: &str,
        to: &str,
        value: u128,
        data: Vec<u8>,
    ) -> Result<usize, LedgerError> {
        self.ensure_owner(caller)?;

        let index = self.transactions.len();
        self.transactions
            .push(Transaction::new(caller, to, value, data.clone()));

        log::info!(
            "Transaction {} proposed by {}: {} to {}",
            index,
            caller,
            value,
            to
        );
        self.notifier.emit(LedgerEvent::TransactionCreated {
            index,
            to: to.to_string(),
            value,
            data,
        });

        Ok(index)
    }

    /// Record the caller's confirmation of a pending transaction
    ///
    /// Reaching the threshold does not execute anything.
    pub fn confirm(&mut self, caller: &str, index: usize) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;

        let tx = pending_mut(&mut self.transactions, index)?;
        if !tx.add_confirmation(caller) {
            return Err(LedgerError::AlreadyConfirmed {
                index,
                owner: caller.to_string(),
            });
        }

        log::info!(
            "Transaction {} confirmed by {} ({}/{})",
            index,
            caller,
            tx.confirmation_count(),
            self.config.threshold
        );
        self.notifier.emit(LedgerEvent::TransactionConfirmed {
            index,
            owner: caller.to_string(),
        });

        Ok(())
    }

    /// Withdraw the caller's confirmation of a pending transaction
    pub fn revoke_confirmation(&mut self, caller: &str, index: usize) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;

        let tx = pending_mut(&mut self.transactions, index)?;
        if !tx.remove_confirmation(caller) {
            return Err(LedgerError::NotConfirmed {
                index,
                owner: caller.to_string(),
            });
        }

        log::info!(
            "Confirmation of transaction {} revoked by {} ({}/{})",
            index,
            caller,
            tx.confirmation_count(),
            self.config.threshold
        );
        self.notifier.emit(LedgerEvent::ConfirmationRevoked {
            index,
            owner: caller.to_string(),
        });

        Ok(())
    }

    /// Execute a transaction that has reached the threshold
    ///
    /// The transaction is marked executed before the transfer runs. If the
    /// custodian refuses the transfer the mark is undone and the call fails
    /// with `TransferFailed`; nothing else changed.
    pub fn execute(&mut self, caller: &str, index: usize) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;

        let need = self.config.threshold;
        let tx = pending_mut(&mut self.transactions, index)?;
        if tx.confirmation_count() < need as usize {
            return Err(LedgerError::InsufficientConfirmations {
                have: tx.confirmation_count(),
                need,
            });
        }

        tx.mark_executed();
        let transfer = self
            .custody
            .transfer(&self.address, tx.to(), tx.value(), tx.data());

        if let Err(e) = transfer {
            tx.rollback_execution();
            log::warn!("Transaction {} transfer failed: {}", index, e);
            return Err(LedgerError::TransferFailed(e));
        }

        tx.finalize_execution();
        log::info!(
            "Transaction {} executed by {}: {} to {}",
            index,
            caller,
            tx.value(),
            tx.to()
        );
        self.notifier
            .emit(LedgerEvent::TransactionExecuted { index });

        Ok(())
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Owners in deployment order
    pub fn owners(&self) -> &[String] {
        &self.config.owners
    }

    pub fn owner_count(&self) -> usize {
        self.config.owner_count()
    }

    pub fn is_owner(&self, id: &str) -> bool {
        self.config.is_owner(id)
    }

    pub fn threshold(&self) -> u32 {
        self.config.threshold
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn label(&self) -> Option<&str> {
        self.config.label.as_deref()
    }

    /// Human-readable description like "2-of-3"
    pub fn description(&self) -> String {
        self.config.description()
    }

    /// Custodial account address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Funds currently held by the custodial account
    pub fn balance(&self) -> u128 {
        self.custody.balance_of(&self.address)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, index: usize) -> Option<&Transaction> {
        self.transactions.get(index)
    }

    /// Snapshot of one transaction
    pub fn transaction_info(&self, index: usize) -> Result<TransactionInfo, LedgerError> {
        self.transaction(index)
            .map(Transaction::info)
            .ok_or(LedgerError::InvalidTransaction(index))
    }

    pub fn status(&self, index: usize) -> Result<TransactionStatus, LedgerError> {
        self.transaction(index)
            .map(|tx| tx.status(self.config.threshold))
            .ok_or(LedgerError::InvalidTransaction(index))
    }

    /// Whether `owner` currently confirms transaction `index`
    pub fn is_confirmed(&self, index: usize, owner: &str) -> Result<bool, LedgerError> {
        self.transaction(index)
            .map(|tx| tx.is_confirmed_by(owner))
            .ok_or(LedgerError::InvalidTransaction(index))
    }

    /// Owners currently confirming transaction `index`
    pub fn confirmations(&self, index: usize) -> Result<Vec<&str>, LedgerError> {
        self.transaction(index)
            .map(Transaction::confirmed_by)
            .ok_or(LedgerError::InvalidTransaction(index))
    }

    /// Indices of transactions not yet executed
    pub fn pending_indices(&self) -> Vec<usize> {
        self.transactions
            .iter()
            .enumerate()
            .filter(|(_, tx)| !tx.executed())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Mutable custodian access for funding and recipient policies
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    /// Re-check every invariant (used after loading from disk)
    pub fn verify_integrity(&self) -> Result<(), LedgerError> {
        self.config.validate()?;

        if self.address != self.config.address() {
            return Err(LedgerError::InvalidConfiguration(format!(
                "address {} does not match owner set",
                self.address
            )));
        }

        for (index, tx) in self.transactions.iter().enumerate() {
            if !tx.is_consistent() {
                return Err(LedgerError::InvalidConfiguration(format!(
                    "transaction {} confirmation count out of sync",
                    index
                )));
            }
            if let Some(owner) = tx.confirmed_by().into_iter().find(|o| !self.is_owner(o)) {
                return Err(LedgerError::InvalidConfiguration(format!(
                    "transaction {} confirmed by non-owner {}",
                    index, owner
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::{parse_ether, TransferError};
    use crate::events::EventLog;

    const DESTINATION: &str = "0x1a78B3162Da1649ABf191ef762A3216189F87A8D";

    fn owners() -> Vec<String> {
        vec!["owner1".to_string(), "owner2".to_string(), "owner3".to_string()]
    }

    fn create_test_ledger() -> (MultisigLedger, EventLog) {
        let config = LedgerConfig::new(owners(), 2, Some("Test".to_string())).unwrap();
        let mut ledger = MultisigLedger::new(config, Bank::new()).unwrap();
        let log = EventLog::new();
        ledger.subscribe(Box::new(log.clone()));
        (ledger, log)
    }

    fn ether(amount: &str) -> u128 {
        parse_ether(amount).unwrap()
    }

    #[test]
    fn test_constructor_parameters() {
        let (ledger, log) = create_test_ledger();

        assert_eq!(ledger.threshold(), 2);
        assert_eq!(ledger.owners(), &owners()[..]);
        assert_eq!(ledger.owner_count(), 3);
        assert_eq!(ledger.transaction_count(), 0);
        assert_eq!(ledger.description(), "2-of-3");
        assert_eq!(ledger.label(), Some("Test"));
        assert!(ledger.address().starts_with('3'));
        assert_eq!(ledger.balance(), 0);
        assert_eq!(ledger.sink_count(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let config = LedgerConfig {
            owners: owners(),
            threshold: 5,
            label: None,
        };
        let result = MultisigLedger::new(config, Bank::new());
        assert!(matches!(result, Err(LedgerError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_non_owner_cannot_propose() {
        let (mut ledger, log) = create_test_ledger();

        let result = ledger.propose("deployer", DESTINATION, ether("0.2"), vec![]);
        assert!(matches!(result, Err(LedgerError::NotAnOwner(_))));
        assert_eq!(ledger.transaction_count(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_propose_creates_transaction() {
        let (mut ledger, log) = create_test_ledger();

        let index = ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();

        assert_eq!(index, 0);
        assert_eq!(ledger.transaction_count(), 1);
        let info = ledger.transaction_info(0).unwrap();
        assert_eq!(info.to, DESTINATION);
        assert_eq!(info.value, ether("0.2"));
        assert!(!info.executed);
        assert_eq!(info.confirmation_count, 0);
        assert_eq!(ledger.transaction(0).unwrap().proposer(), "owner1");

        assert_eq!(
            log.last(),
            Some(LedgerEvent::TransactionCreated {
                index: 0,
                to: DESTINATION.to_string(),
                value: ether("0.2"),
                data: vec![],
            })
        );
    }

    #[test]
    fn test_indices_are_dense() {
        let (mut ledger, _) = create_test_ledger();

        for expected in 0..4 {
            let index = ledger.propose("owner2", DESTINATION, 0, vec![]).unwrap();
            assert_eq!(index, expected);
        }
        assert_eq!(ledger.transaction_count(), 4);
        assert_eq!(ledger.pending_indices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_confirm_counts_owners() {
        let (mut ledger, log) = create_test_ledger();
        ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();

        ledger.confirm("owner1", 0).unwrap();
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 1);
        assert_eq!(
            log.last(),
            Some(LedgerEvent::TransactionConfirmed {
                index: 0,
                owner: "owner1".to_string()
            })
        );

        ledger.confirm("owner2", 0).unwrap();
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 2);
        assert_eq!(ledger.confirmations(0).unwrap(), vec!["owner1", "owner2"]);
        assert_eq!(ledger.status(0).unwrap(), TransactionStatus::Ready);
        // Threshold reached but nothing executed
        assert!(!ledger.transaction_info(0).unwrap().executed);
    }

    #[test]
    fn test_confirm_invalid_transaction() {
        let (mut ledger, _) = create_test_ledger();

        let result = ledger.confirm("owner1", 0);
        assert_eq!(result, Err(LedgerError::InvalidTransaction(0)));
    }

    #[test]
    fn test_confirm_twice_rejected() {
        let (mut ledger, log) = create_test_ledger();
        ledger.propose("owner1", DESTINATION, 1, vec![]).unwrap();
        ledger.confirm("owner1", 0).unwrap();
        let events_before = log.len();

        let result = ledger.confirm("owner1", 0);
        assert!(matches!(result, Err(LedgerError::AlreadyConfirmed { index: 0, .. })));
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 1);
        assert_eq!(log.len(), events_before);
    }

    #[test]
    fn test_non_owner_cannot_confirm() {
        let (mut ledger, _) = create_test_ledger();
        ledger.propose("owner1", DESTINATION, 1, vec![]).unwrap();

        let result = ledger.confirm("mallory", 0);
        assert!(matches!(result, Err(LedgerError::NotAnOwner(_))));
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 0);
    }

    #[test]
    fn test_revoke_round_trip() {
        let (mut ledger, log) = create_test_ledger();
        ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();
        ledger.confirm("owner1", 0).unwrap();

        ledger.revoke_confirmation("owner1", 0).unwrap();

        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 0);
        assert!(!ledger.is_confirmed(0, "owner1").unwrap());
        assert_eq!(
            log.last(),
            Some(LedgerEvent::ConfirmationRevoked {
                index: 0,
                owner: "owner1".to_string()
            })
        );
    }

    #[test]
    fn test_revoke_errors() {
        let (mut ledger, _) = create_test_ledger();

        assert_eq!(
            ledger.revoke_confirmation("owner1", 0),
            Err(LedgerError::InvalidTransaction(0))
        );

        ledger.propose("owner1", DESTINATION, 1, vec![]).unwrap();
        ledger.confirm("owner2", 0).unwrap();

        let result = ledger.revoke_confirmation("owner1", 0);
        assert!(matches!(result, Err(LedgerError::NotConfirmed { index: 0, .. })));
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 1);

        assert!(matches!(
            ledger.revoke_confirmation("mallory", 0),
            Err(LedgerError::NotAnOwner(_))
        ));
    }

    #[test]
    fn test_confirmations_scoped_per_transaction() {
        let (mut ledger, _) = create_test_ledger();
        ledger.propose("owner1", DESTINATION, 1, vec![]).unwrap();
        ledger.propose("owner1", DESTINATION, 2, vec![]).unwrap();

        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner1", 1).unwrap();
        ledger.revoke_confirmation("owner1", 0).unwrap();

        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 0);
        assert_eq!(ledger.transaction_info(1).unwrap().confirmation_count, 1);
    }

    #[test]
    fn test_execute_threshold_gate() {
        let (mut ledger, log) = create_test_ledger();
        ledger.deposit("owner1", ether("1.0")).unwrap();
        ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();
        ledger.confirm("owner1", 0).unwrap();

        let result = ledger.execute("owner1", 0);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientConfirmations { have: 1, need: 2 })
        );
        assert!(!ledger.transaction_info(0).unwrap().executed);

        ledger.confirm("owner2", 0).unwrap();
        ledger.execute("owner1", 0).unwrap();

        assert!(ledger.transaction_info(0).unwrap().executed);
        assert!(ledger.transaction(0).unwrap().executed_at().is_some());
        assert_eq!(ledger.status(0).unwrap(), TransactionStatus::Executed);
        assert_eq!(
            log.last(),
            Some(LedgerEvent::TransactionExecuted { index: 0 })
        );
    }

    #[test]
    fn test_non_owner_cannot_execute() {
        let (mut ledger, log) = create_test_ledger();
        ledger.deposit("owner1", ether("1.0")).unwrap();
        ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();
        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner2", 0).unwrap();
        let events_before = log.len();

        let result = ledger.execute("mallory", 0);
        assert_eq!(result, Err(LedgerError::NotAnOwner("mallory".to_string())));
        assert!(!ledger.transaction_info(0).unwrap().executed);
        assert_eq!(ledger.balance(), ether("1.0"));
        assert_eq!(ledger.custody().balance_of(DESTINATION), 0);
        assert_eq!(log.len(), events_before);
    }

    #[test]
    fn test_execute_invalid_transaction() {
        let (mut ledger, _) = create_test_ledger();
        ledger.deposit("owner1", 100).unwrap();
        ledger.propose("owner1", DESTINATION, 10, vec![]).unwrap();

        assert_eq!(
            ledger.execute("owner1", 5),
            Err(LedgerError::InvalidTransaction(5))
        );
        assert_eq!(
            ledger.execute("owner1", ledger.transaction_count()),
            Err(LedgerError::InvalidTransaction(1))
        );
        assert_eq!(ledger.balance(), 100);
    }

    #[test]
    fn test_no_double_spend() {
        let (mut ledger, _) = create_test_ledger();
        ledger.deposit("owner1", ether("1.0")).unwrap();
        ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();
        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner2", 0).unwrap();
        ledger.execute("owner2", 0).unwrap();

        let result = ledger.execute("owner3", 0);
        assert_eq!(result, Err(LedgerError::AlreadyExecuted(0)));
        assert_eq!(ledger.custody().balance_of(DESTINATION), ether("0.2"));
        assert_eq!(ledger.balance(), ether("0.8"));
    }

    #[test]
    fn test_executed_transaction_is_frozen() {
        let (mut ledger, _) = create_test_ledger();
        ledger.deposit("owner1", 10).unwrap();
        ledger.propose("owner1", DESTINATION, 10, vec![]).unwrap();
        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner2", 0).unwrap();
        ledger.execute("owner1", 0).unwrap();

        assert_eq!(
            ledger.confirm("owner3", 0),
            Err(LedgerError::AlreadyExecuted(0))
        );
        assert_eq!(
            ledger.revoke_confirmation("owner1", 0),
            Err(LedgerError::AlreadyExecuted(0))
        );
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 2);
        assert!(ledger.pending_indices().is_empty());
    }

    #[test]
    fn test_failed_transfer_rolls_back() {
        let (mut ledger, log) = create_test_ledger();
        ledger.deposit("owner1", ether("0.1")).unwrap();
        ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();
        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner3", 0).unwrap();
        let events_before = log.len();

        let result = ledger.execute("owner1", 0);
        assert_eq!(
            result,
            Err(LedgerError::TransferFailed(TransferError::InsufficientFunds {
                have: ether("0.1"),
                need: ether("0.2"),
            }))
        );
        assert!(!ledger.transaction_info(0).unwrap().executed);
        assert!(ledger.transaction(0).unwrap().executed_at().is_none());
        assert_eq!(ledger.balance(), ether("0.1"));
        assert_eq!(ledger.custody().balance_of(DESTINATION), 0);
        assert_eq!(log.len(), events_before);

        // Caller retries once the account is topped up
        ledger.deposit("owner2", ether("0.1")).unwrap();
        ledger.execute("owner1", 0).unwrap();
        assert_eq!(ledger.custody().balance_of(DESTINATION), ether("0.2"));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_rejecting_destination_rolls_back() {
        let (mut ledger, _) = create_test_ledger();
        ledger.deposit("owner1", 100).unwrap();
        ledger.custody_mut().reject_incoming(DESTINATION);
        ledger.propose("owner1", DESTINATION, 40, b"call".to_vec()).unwrap();
        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner2", 0).unwrap();

        let result = ledger.execute("owner2", 0);
        assert!(matches!(
            result,
            Err(LedgerError::TransferFailed(TransferError::Rejected { .. }))
        ));
        assert!(!ledger.transaction_info(0).unwrap().executed);
        assert_eq!(ledger.balance(), 100);
    }

    #[test]
    fn test_data_is_forwarded() {
        let (mut ledger, _) = create_test_ledger();
        ledger.deposit("owner1", 100).unwrap();
        ledger.custody_mut().on_receive(DESTINATION, |incoming| {
            if incoming.data == [0xca, 0xfe] {
                Ok(())
            } else {
                Err("unexpected payload".to_string())
            }
        });
        ledger
            .propose("owner1", DESTINATION, 0, vec![0xca, 0xfe])
            .unwrap();
        ledger.confirm("owner1", 0).unwrap();
        ledger.confirm("owner2", 0).unwrap();

        ledger.execute("owner3", 0).unwrap();
        assert!(ledger.transaction_info(0).unwrap().executed);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (mut ledger, log) = create_test_ledger();

        let balance = ledger.deposit("owner1", ether("1.0")).unwrap();
        assert_eq!(balance, ether("1.0"));

        let index = ledger
            .propose("owner1", DESTINATION, ether("0.2"), vec![])
            .unwrap();
        assert_eq!(index, 0);

        ledger.confirm("owner1", 0).unwrap();
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 1);
        ledger.confirm("owner2", 0).unwrap();
        assert_eq!(ledger.transaction_info(0).unwrap().confirmation_count, 2);

        ledger.execute("owner1", 0).unwrap();

        assert!(ledger.transaction_info(0).unwrap().executed);
        assert_eq!(ledger.custody().balance_of(DESTINATION), ether("0.2"));
        assert_eq!(ledger.balance(), ether("0.8"));

        let names: Vec<&str> = log.events().iter().map(|e| e.type_name()).collect();
        assert_eq!(
            names,
            vec![
                "Deposit",
                "TransactionCreated",
                "TransactionConfirmed",
                "TransactionConfirmed",
                "TransactionExecuted",
            ]
        );
        ledger.verify_integrity().unwrap();
    }

    #[test]
    fn test_serialization_round_trip() {
        let (mut ledger, _) = create_test_ledger();
        ledger.deposit("owner1", 500).unwrap();
        ledger.propose("owner1", DESTINATION, 100, vec![1, 2]).unwrap();
        ledger.confirm("owner3", 0).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: MultisigLedger = serde_json::from_str(&json).unwrap();

        restored.verify_integrity().unwrap();
        assert_eq!(restored.address(), ledger.address());
        assert_eq!(restored.balance(), 500);
        assert_eq!(restored.transaction_info(0).unwrap(), ledger.transaction_info(0).unwrap());
        assert!(restored.is_confirmed(0, "owner3").unwrap());
    }

    #[test]
    fn test_tampered_state_fails_integrity() {
        let (mut ledger, _) = create_test_ledger();
        ledger.propose("owner1", DESTINATION, 1, vec![]).unwrap();
        ledger.confirm("owner1", 0).unwrap();

        let json = serde_json::to_string(&ledger)
            .unwrap()
            .replace("\"owner1\"]", "\"mallory\"]");
        let restored: MultisigLedger = serde_json::from_str(&json).unwrap();

        assert!(matches!(
            restored.verify_integrity(),
            Err(LedgerError::InvalidConfiguration(_))
        ));
    }
}
