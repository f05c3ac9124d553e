//! Thread-safe ledger handle
//!
//! All operations run under one mutex, so no caller ever observes a
//! partially applied operation. Mutating calls run receive hooks and event
//! sinks while the lock is held; a call made from that same thread before
//! the operation returns (a hook or sink calling back in) is rejected with
//! `Reentrant` rather than deadlocking. Other threads simply wait for the
//! lock.

use crate::custody::{Bank, Custodian};
use crate::events::EventSink;
use crate::ledger::config::LedgerError;
use crate::ledger::ledger::MultisigLedger;
use crate::ledger::transaction::TransactionInfo;
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

/// Mutex-serialized ledger shared between callers
#[derive(Debug)]
pub struct SharedLedger<C = Bank> {
    inner: Mutex<MultisigLedger<C>>,
    /// Thread currently inside a mutating call, if any
    in_flight: Mutex<Option<ThreadId>>,
}

/// Clears the in-flight marker when a mutating call returns or unwinds
struct InFlight<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        match self.slot.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

impl<C: Custodian> SharedLedger<C> {
    pub fn new(ledger: MultisigLedger<C>) -> Self {
        Self {
            inner: Mutex::new(ledger),
            in_flight: Mutex::new(None),
        }
    }

    fn guard_reentry(&self) -> Result<(), LedgerError> {
        let in_flight = self
            .in_flight
            .lock()
            .map_err(|_| LedgerError::LockPoisoned)?;
        if *in_flight == Some(thread::current().id()) {
            log::warn!("Rejected reentrant ledger call during transfer");
            return Err(LedgerError::Reentrant);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MultisigLedger<C>>, LedgerError> {
        self.guard_reentry()?;
        self.inner.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Run a read-only closure against the ledger
    pub fn read<T>(&self, f: impl FnOnce(&MultisigLedger<C>) -> T) -> Result<T, LedgerError> {
        let ledger = self.lock()?;
        Ok(f(&ledger))
    }

    /// Run a mutating closure with the in-flight marker set
    ///
    /// Callbacks fired by the closure on this thread see the marker and
    /// fail in `guard_reentry` instead of blocking on `inner`.
    fn with_mut<T>(
        &self,
        f: impl FnOnce(&mut MultisigLedger<C>) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut ledger = self.lock()?;

        *self
            .in_flight
            .lock()
            .map_err(|_| LedgerError::LockPoisoned)? = Some(thread::current().id());
        let _in_flight = InFlight {
            slot: &self.in_flight,
        };

        f(&mut ledger)
    }

    pub fn subscribe(&self, sink: Box<dyn EventSink>) -> Result<(), LedgerError> {
        self.lock()?.subscribe(sink);
        Ok(())
    }

    pub fn deposit(&self, sender: &str, amount: u128) -> Result<u128, LedgerError> {
        self.with_mut(|l| l.deposit(sender, amount))
    }

    pub fn propose(
        &self,
        caller: &str,
        to: &str,
        value: u128,
        data: Vec<u8>,
    ) -> Result<usize, LedgerError> {
        self.with_mut(|l| l.propose(caller, to, value, data))
    }

    pub fn confirm(&self, caller: &str, index: usize) -> Result<(), LedgerError> {
        self.with_mut(|l| l.confirm(caller, index))
    }

    pub fn revoke_confirmation(&self, caller: &str, index: usize) -> Result<(), LedgerError> {
        self.with_mut(|l| l.revoke_confirmation(caller, index))
    }

    pub fn execute(&self, caller: &str, index: usize) -> Result<(), LedgerError> {
        self.with_mut(|l| l.execute(caller, index))
    }

    pub fn threshold(&self) -> Result<u32, LedgerError> {
        self.read(|l| l.threshold())
    }

    pub fn owners(&self) -> Result<Vec<String>, LedgerError> {
        self.read(|l| l.owners().to_vec())
    }

    pub fn transaction_count(&self) -> Result<usize, LedgerError> {
        self.read(|l| l.transaction_count())
    }

    pub fn transaction_info(&self, index: usize) -> Result<TransactionInfo, LedgerError> {
        self.read(|l| l.transaction_info(index))?
    }

    pub fn balance(&self) -> Result<u128, LedgerError> {
        self.read(|l| l.balance())
    }

    /// Give back the owned ledger
    pub fn into_inner(self) -> Result<MultisigLedger<C>, LedgerError> {
        self.inner.into_inner().map_err(|_| LedgerError::LockPoisoned)
    }
}
