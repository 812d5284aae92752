// src/recording/tracker.rs
//! Pending-request tracker
//!
//! Counts in-flight mockable exchanges for one session and lets callers wait
//! until every live response has been recorded. In strict mode the first
//! failed settlement is latched and rejects every current and future drain.
//!
//! # Protocol
//!
//! ```text
//! request hook (cache miss) → on_dispatch(key)
//!                                   │
//!                           live network round trip
//!                                   │
//! response hook → store.write → on_settled(key, outcome) → notify drain waiters
//! ```

use crate::utils::errors::{EngineError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, warn};

/// How a dispatched exchange ended
#[derive(Debug, Clone)]
pub enum Settlement {
    /// Response captured (or already present) in the store
    Recorded(PathBuf),

    /// Body read or store write failed
    Failed {
        method: String,
        url: String,
        reason: EngineError,
    },
}

/// Point-in-time view of the tracker
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    /// Pending keys, sorted, one entry per in-flight exchange
    pub pending: Vec<String>,

    /// Latched strict-mode failure, if any
    pub failure: Option<EngineError>,
}

impl TrackerSnapshot {
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Multiset: one count per in-flight exchange with that key
    pending: HashMap<String, usize>,
    in_flight: usize,
    failure: Option<EngineError>,
}

/// Session-scoped set of in-flight mockable exchanges
#[derive(Debug)]
pub struct PendingTracker {
    strict: bool,
    state: Mutex<TrackerState>,
    /// Bumped after every state change; drain waiters re-check on change
    generation: watch::Sender<u64>,
}

impl PendingTracker {
    pub fn new(strict: bool) -> Self {
        let (generation, _) = watch::channel(0);

        Self {
            strict,
            state: Mutex::new(TrackerState::default()),
            generation,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// A mockable request was forwarded to the live network
    pub fn on_dispatch(&self, key: &str) {
        let in_flight = {
            let mut state = self.state.lock();
            *state.pending.entry(key.to_string()).or_insert(0) += 1;
            state.in_flight += 1;
            state.in_flight
        };

        debug!("Dispatched {} ({} in flight)", key, in_flight);
        self.notify();
    }

    /// The exchange for `key` finished, successfully or not
    pub fn on_settled(&self, key: &str, outcome: Settlement) {
        let in_flight = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            match state.pending.get_mut(key) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    state.in_flight -= 1;
                }
                Some(_) => {
                    state.pending.remove(key);
                    state.in_flight -= 1;
                }
                None => warn!("Settled {} which was not pending", key),
            }

            if let Settlement::Failed { method, url, reason } = &outcome {
                if self.strict && state.failure.is_none() {
                    warn!("Strict mode: mock for {} {} unavailable: {}", method, url, reason);
                    state.failure = Some(EngineError::MockNotFound {
                        method: method.clone(),
                        url: url.clone(),
                    });
                }
            }

            state.in_flight
        };

        debug!("Settled {} ({} in flight)", key, in_flight);
        self.notify();
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.state.lock().pending.contains_key(key)
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.lock();

        let mut pending: Vec<String> = state
            .pending
            .iter()
            .flat_map(|(key, count)| std::iter::repeat(key.clone()).take(*count))
            .collect();
        pending.sort();

        TrackerSnapshot {
            pending,
            failure: state.failure.clone(),
        }
    }

    /// Wait until nothing is in flight
    ///
    /// A latched strict failure rejects with `MockNotFound` and takes priority
    /// over an empty set. Any number of callers may wait at once.
    pub async fn drain(&self) -> Result<()> {
        // Subscribe before checking so a change between check and wait is not lost
        let mut changes = self.generation.subscribe();

        loop {
            {
                let state = self.state.lock();
                if let Some(failure) = &state.failure {
                    return Err(failure.clone());
                }
                if state.in_flight == 0 {
                    return Ok(());
                }
            }

            // The sender lives as long as self, so this only fails on teardown
            if changes.changed().await.is_err() {
                return Ok(());
            }
        }
    }

    fn notify(&self) {
        self.generation.send_modify(|generation| *generation += 1);
    }
}
