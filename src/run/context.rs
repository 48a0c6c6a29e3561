use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::{Semaphore, watch};

/// Probe-fact key for the target's `Server` header.
pub const FIELD_SERVER_NAME: &str = "ServerName";
/// Probe-fact key for the target's document length in bytes.
pub const FIELD_CONTENT_SIZE: &str = "ContentSize";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProbeValue {
    Text(String),
    Int(u64),
}

/// Snapshot of the probe facts handed to the report layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeFacts {
    pub server_name: Option<String>,
    pub content_size: Option<u64>,
}

/// Campaign-scoped coordination: the startup barrier, the begin gate, the
/// stop broadcast and the probe-fact store.
///
/// The barrier counts every worker plus the dispatcher. Probe facts are
/// written before any worker starts and only read afterwards.
#[derive(Debug)]
pub struct RunContext {
    parties: u32,
    ready: Semaphore,
    start_tx: watch::Sender<bool>,
    stop_tx: watch::Sender<bool>,
    facts: RwLock<HashMap<String, ProbeValue>>,
}

impl RunContext {
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let parties = u32::try_from(workers)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        let (start_tx, _) = watch::channel(false);
        let (stop_tx, _) = watch::channel(false);
        Self {
            parties,
            ready: Semaphore::new(0),
            start_tx,
            stop_tx,
            facts: RwLock::new(HashMap::new()),
        }
    }

    pub fn report_ready(&self) {
        self.ready.add_permits(1);
    }

    /// Resolves once every worker and the dispatcher reported ready.
    pub async fn await_ready(&self) {
        if let Ok(permits) = self.ready.acquire_many(self.parties).await {
            permits.forget();
        }
    }

    pub fn release_start(&self) {
        self.start_tx.send_replace(true);
    }

    pub async fn await_start(&self) {
        let mut start_rx = self.start_tx.subscribe();
        drop(start_rx.wait_for(|started| *started).await);
    }

    /// Broadcasts the stop signal. Returns `true` only for the call that
    /// actually flipped it.
    pub fn signal_stop(&self) -> bool {
        self.stop_tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Resolves once the stop signal fired. Cancel-safe.
    pub async fn stopped(&self) {
        let mut stop_rx = self.stop_tx.subscribe();
        drop(stop_rx.wait_for(|stopped| *stopped).await);
    }

    pub fn set_text(&self, key: &str, value: impl Into<String>) {
        self.facts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), ProbeValue::Text(value.into()));
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self
            .facts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            Some(ProbeValue::Text(value)) => Some(value.clone()),
            Some(ProbeValue::Int(_)) | None => None,
        }
    }

    pub fn set_int(&self, key: &str, value: u64) {
        self.facts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), ProbeValue::Int(value));
    }

    #[must_use]
    pub fn int(&self, key: &str) -> Option<u64> {
        match self
            .facts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            Some(ProbeValue::Int(value)) => Some(*value),
            Some(ProbeValue::Text(_)) | None => None,
        }
    }

    #[must_use]
    pub fn probe_facts(&self) -> ProbeFacts {
        ProbeFacts {
            server_name: self.text(FIELD_SERVER_NAME),
            content_size: self.int(FIELD_CONTENT_SIZE),
        }
    }
}
