//! Ledger notifications
//!
//! Every successful mutating call on a ledger emits exactly one
//! [`LedgerEvent`]. Delivery is decoupled from the ledger through the
//! [`EventSink`] trait: the ledger hands each event to every subscribed sink
//! and does not care whether it is recorded, logged or broadcast.

pub mod broadcast;

pub use broadcast::EventBroadcaster;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// State change notifications
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    /// Funds arrived in the custodial account
    Deposit {
        sender: String,
        amount: u128,
        balance: u128,
    },
    /// A transfer was proposed
    TransactionCreated {
        index: usize,
        to: String,
        value: u128,
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
    /// An owner confirmed a proposal
    TransactionConfirmed { index: usize, owner: String },
    /// An owner withdrew a confirmation
    ConfirmationRevoked { index: usize, owner: String },
    /// A proposal was executed and its funds moved
    TransactionExecuted { index: usize },
}

impl LedgerEvent {
    /// Short event name
    pub fn type_name(&self) -> &'static str {
        match self {
            LedgerEvent::Deposit { .. } => "Deposit",
            LedgerEvent::TransactionCreated { .. } => "TransactionCreated",
            LedgerEvent::TransactionConfirmed { .. } => "TransactionConfirmed",
            LedgerEvent::ConfirmationRevoked { .. } => "ConfirmationRevoked",
            LedgerEvent::TransactionExecuted { .. } => "TransactionExecuted",
        }
    }

    /// Transaction index the event refers to, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            LedgerEvent::Deposit { .. } => None,
            LedgerEvent::TransactionCreated { index, .. }
            | LedgerEvent::TransactionConfirmed { index, .. }
            | LedgerEvent::ConfirmationRevoked { index, .. }
            | LedgerEvent::TransactionExecuted { index } => Some(*index),
        }
    }
}

/// Receiver of ledger notifications
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &LedgerEvent);
}

/// Fan-out list of subscribed sinks
#[derive(Default)]
pub struct Notifier {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn emit(&self, event: LedgerEvent) {
        for sink in &self.sinks {
            sink.notify(&event);
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// Sink that records every event in order
///
/// Clones share the same record, so a test can keep one handle and
/// subscribe the other.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<LedgerEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent event
    pub fn last(&self) -> Option<LedgerEvent> {
        self.events().last().cloned()
    }
}

impl EventSink for EventLog {
    fn notify(&self, event: &LedgerEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
