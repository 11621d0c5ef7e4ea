use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::channel::oneshot;

use crate::provider::MapsProvider;

/// Observable progress of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    Loading,
    Loaded,
}

/// Why a load attempt failed. Every waiter of the attempt receives a copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct LoadFailure {
    pub reason: String,
}

impl LoadFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A continuation parked until the current attempt settles
pub type Waiter = Box<dyn FnOnce(Result<(), LoadFailure>) + Send>;

enum Phase {
    NotStarted,
    Loading { attempt: u64 },
    Loaded(Arc<dyn MapsProvider>),
}

struct GateState {
    phase: Phase,
    waiters: Vec<Waiter>,
    attempts: u64,
}

/// Single-flight initialization guard for the provider runtime.
///
/// Clones share the same gate.
#[derive(Clone)]
pub struct LoadGate {
    inner: Arc<Mutex<GateState>>,
}

impl LoadGate {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(GateState {
                phase: Phase::NotStarted,
                waiters: Vec::new(),
                attempts: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> LoadState {
        match &self.lock().phase {
            Phase::NotStarted => LoadState::NotStarted,
            Phase::Loading { .. } => LoadState::Loading,
            Phase::Loaded(_) => LoadState::Loaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    /// The loaded runtime, if the gate has opened
    pub fn provider(&self) -> Option<Arc<dyn MapsProvider>> {
        match &self.lock().phase {
            Phase::Loaded(provider) => Some(provider.clone()),
            _ => None,
        }
    }

    /// Number of load attempts started so far
    pub fn attempts(&self) -> u64 {
        self.lock().attempts
    }

    pub fn pending_waiters(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Parks `waiter` until the next attempt settles, without starting one.
    /// Runs it right away when the gate is already open.
    pub fn subscribe<F>(&self, waiter: F)
    where
        F: FnOnce(Result<(), LoadFailure>) + Send + 'static,
    {
        {
            let mut state = self.lock();
            if !matches!(state.phase, Phase::Loaded(_)) {
                state.waiters.push(Box::new(waiter));
                return;
            }
        }
        waiter(Ok(()));
    }

    /// Resolves once the runtime is loaded.
    ///
    /// The first caller while the gate is closed moves it to `Loading` and
    /// invokes `start` with the attempt's [`LoadSignal`]; everyone arriving
    /// before the signal fires joins the same attempt and `start` is not
    /// called again. Once loaded this returns without suspending.
    pub async fn ensure_loaded<F>(&self, start: F) -> Result<Arc<dyn MapsProvider>, LoadFailure>
    where
        F: FnOnce(LoadSignal),
    {
        let (tx, rx) = oneshot::channel();
        let waiter: Waiter = Box::new(move |outcome| {
            let _ = tx.send(outcome);
        });

        let signal = {
            let mut state = self.lock();
            let in_flight = match &state.phase {
                Phase::Loaded(provider) => return Ok(provider.clone()),
                Phase::Loading { attempt } => Some(*attempt),
                Phase::NotStarted => None,
            };
            match in_flight {
                Some(attempt) => {
                    log::debug!(
                        "joining load attempt {} ({} already waiting)",
                        attempt,
                        state.waiters.len()
                    );
                    state.waiters.push(waiter);
                    None
                }
                None => {
                    state.attempts += 1;
                    let attempt = state.attempts;
                    state.phase = Phase::Loading { attempt };
                    state.waiters.push(waiter);
                    Some(LoadSignal {
                        gate: self.clone(),
                        attempt,
                    })
                }
            }
        };

        // The loader may settle synchronously, so it runs without the lock.
        if let Some(signal) = signal {
            log::debug!("starting load attempt {}", signal.attempt);
            start(signal);
        }

        match rx.await {
            Ok(Ok(())) => self
                .provider()
                .ok_or_else(|| LoadFailure::new("runtime missing after load")),
            Ok(Err(failure)) => Err(failure),
            Err(_) => Err(LoadFailure::new("load waiter dropped before settling")),
        }
    }

    fn settle(&self, attempt: u64, outcome: Result<Arc<dyn MapsProvider>, LoadFailure>) {
        let (waiters, result) = {
            let mut state = self.lock();
            match &state.phase {
                Phase::Loading { attempt: current } if *current == attempt => {}
                _ => {
                    log::warn!("ignoring completion of superseded load attempt {}", attempt);
                    return;
                }
            }
            let result = match outcome {
                Ok(provider) => {
                    state.phase = Phase::Loaded(provider);
                    Ok(())
                }
                Err(failure) => {
                    // Failed attempts leave the gate retryable.
                    state.phase = Phase::NotStarted;
                    Err(failure)
                }
            };
            (std::mem::take(&mut state.waiters), result)
        };

        match &result {
            Ok(()) => log::info!(
                "load attempt {} succeeded, releasing {} waiters",
                attempt,
                waiters.len()
            ),
            Err(failure) => log::warn!(
                "load attempt {} failed, releasing {} waiters: {}",
                attempt,
                waiters.len(),
                failure
            ),
        }

        for waiter in waiters {
            waiter(result.clone());
        }
    }
}

impl Default for LoadGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadGate")
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .field("pending_waiters", &self.pending_waiters())
            .finish()
    }
}

/// One-shot completion channel for a single load attempt.
///
/// Settling consumes the signal. A signal that is dropped without being
/// settled leaves the attempt, and everyone waiting on it, pending.
#[must_use = "a load attempt only settles through its signal"]
pub struct LoadSignal {
    gate: LoadGate,
    attempt: u64,
}

impl LoadSignal {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Opens the gate with the loaded runtime
    pub fn succeed(self, provider: Arc<dyn MapsProvider>) {
        self.gate.settle(self.attempt, Ok(provider));
    }

    /// Fails the attempt; the gate becomes retryable
    pub fn fail(self, reason: impl Into<String>) {
        self.gate.settle(self.attempt, Err(LoadFailure::new(reason)));
    }
}

impl fmt::Debug for LoadSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadSignal")
            .field("attempt", &self.attempt)
            .finish()
    }
}
