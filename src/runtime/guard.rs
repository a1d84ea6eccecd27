//! Runtime guard: lifecycle and exclusive access for the embedded runtime.
//!
//! Acquirers take a ticket and are admitted strictly in ticket order. The
//! admitted caller receives an [`ExecutionToken`]; dropping the token is the
//! only way back to "free", so the runtime is released on every exit path,
//! including early returns and panics inside the runtime call.

use super::{EmbeddedRuntime, GuardMetrics};
use crate::error::{GuardError, RuntimeFault};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The process-wide guard (installed once by the host)
static GLOBAL: OnceLock<Arc<RuntimeGuard>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Ready,
    ShutDown,
}

/// Admission state, protected by `RuntimeGuard::admission`.
#[derive(Debug)]
struct Admission {
    phase: Phase,
    held: bool,
    queue: VecDeque<u64>,
    next_ticket: u64,
}

impl Admission {
    fn check_ready(&self) -> Result<(), GuardError> {
        match self.phase {
            Phase::Uninitialized => Err(GuardError::NotInitialized),
            Phase::ShutDown => Err(GuardError::ShutDown),
            Phase::Ready => Ok(()),
        }
    }

    fn is_turn_of(&self, ticket: u64) -> bool {
        !self.held && self.queue.front() == Some(&ticket)
    }
}

/// Owner of the one embedded runtime instance.
pub struct RuntimeGuard {
    admission: Mutex<Admission>,
    turn: Condvar,
    runtime: Mutex<Box<dyn EmbeddedRuntime>>,
    metrics: GuardMetrics,
}

impl RuntimeGuard {
    /// Wrap a runtime. The runtime is not started until [`initialize`](Self::initialize).
    pub fn new(runtime: impl EmbeddedRuntime + 'static) -> Self {
        Self::from_boxed(Box::new(runtime))
    }

    pub fn from_boxed(runtime: Box<dyn EmbeddedRuntime>) -> Self {
        Self {
            admission: Mutex::new(Admission {
                phase: Phase::Uninitialized,
                held: false,
                queue: VecDeque::new(),
                next_ticket: 0,
            }),
            turn: Condvar::new(),
            runtime: Mutex::new(runtime),
            metrics: GuardMetrics::new(),
        }
    }

    /// Install the process-wide guard.
    ///
    /// # Errors
    /// `GlobalAlreadyInstalled` if a global guard has already been installed.
    /// The installed guard is left untouched.
    pub fn install_global(guard: Arc<RuntimeGuard>) -> Result<Arc<RuntimeGuard>, GuardError> {
        GLOBAL
            .set(Arc::clone(&guard))
            .map_err(|_| GuardError::GlobalAlreadyInstalled)?;
        Ok(guard)
    }

    /// The process-wide guard, if one has been installed.
    pub fn global() -> Option<Arc<RuntimeGuard>> {
        GLOBAL.get().cloned()
    }

    /// Start the embedded runtime. Must succeed before any `acquire`.
    ///
    /// # Errors
    /// * `AlreadyInitialized` if the runtime was already started (or shut down)
    /// * `InitializationFailed` if the runtime refused to start; the guard
    ///   stays uninitialized and the call may be repeated
    pub fn initialize(&self) -> Result<(), GuardError> {
        let mut admission = self.admission.lock();
        if admission.phase != Phase::Uninitialized {
            return Err(GuardError::AlreadyInitialized);
        }

        // Admission stays locked so no acquirer observes a half-started runtime
        self.runtime.lock().start().map_err(|fault| {
            warn!("Embedded runtime failed to start: {}", fault);
            GuardError::InitializationFailed {
                detail: fault.to_string(),
            }
        })?;

        admission.phase = Phase::Ready;
        info!("Embedded runtime initialized");
        Ok(())
    }

    /// Block until the runtime is free, then take exclusive access.
    ///
    /// # Errors
    /// `NotInitialized` before `initialize`, `ShutDown` after `shutdown`.
    /// Neither case blocks.
    pub fn acquire(&self) -> Result<ExecutionToken<'_>, GuardError> {
        self.acquire_inner(None)
    }

    /// Like [`acquire`](Self::acquire), but give up after `timeout`.
    ///
    /// # Errors
    /// `AcquireTimeout` if the runtime did not become free in time. The
    /// caller's place in the queue is given up. A timeout too large to be
    /// represented as a deadline waits without bound.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<ExecutionToken<'_>, GuardError> {
        self.acquire_inner(Some(timeout))
    }

    fn acquire_inner(&self, timeout: Option<Duration>) -> Result<ExecutionToken<'_>, GuardError> {
        let started = Instant::now();
        let deadline = timeout.and_then(|t| started.checked_add(t));

        let mut admission = self.admission.lock();
        admission.check_ready()?;

        let ticket = admission.next_ticket;
        admission.next_ticket += 1;
        admission.queue.push_back(ticket);

        let contended = !admission.is_turn_of(ticket);
        if contended {
            debug!(
                "Ticket {} waiting for embedded runtime ({} ahead)",
                ticket,
                admission.queue.len() - 1 + usize::from(admission.held)
            );
        }

        while !admission.is_turn_of(ticket) {
            match deadline {
                None => self.turn.wait(&mut admission),
                Some(deadline) => {
                    let expired = self.turn.wait_until(&mut admission, deadline).timed_out();
                    if expired && !admission.is_turn_of(ticket) {
                        admission.queue.retain(|t| *t != ticket);
                        // The head of the queue may have changed
                        self.turn.notify_all();
                        drop(admission);

                        self.metrics.record_timeout();
                        let waited = started.elapsed();
                        warn!("Ticket {} gave up on embedded runtime after {:?}", ticket, waited);
                        return Err(GuardError::AcquireTimeout { waited });
                    }
                }
            }
        }

        admission.queue.pop_front();
        admission.held = true;
        drop(admission);

        self.metrics.record_acquisition(contended);
        Ok(ExecutionToken {
            guard: self,
            runtime: Some(self.runtime.lock()),
        })
    }

    fn release(&self) {
        let mut admission = self.admission.lock();
        admission.held = false;
        self.metrics.record_release();
        self.turn.notify_all();
    }

    /// Tear the embedded runtime down.
    ///
    /// # Errors
    /// * `Busy` while a token is held or acquirers are queued
    /// * `NotInitialized` if the runtime was never started
    /// * `ShutDown` if it was already torn down
    pub fn shutdown(&self) -> Result<(), GuardError> {
        let mut admission = self.admission.lock();
        admission.check_ready()?;
        if admission.held || !admission.queue.is_empty() {
            return Err(GuardError::Busy);
        }

        self.runtime.lock().stop();
        admission.phase = Phase::ShutDown;
        info!("Embedded runtime shut down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.admission.lock().phase == Phase::Ready
    }

    /// Whether a token is currently outstanding.
    pub fn is_held(&self) -> bool {
        self.admission.lock().held
    }

    /// Number of callers queued behind the current holder.
    pub fn waiting(&self) -> usize {
        self.admission.lock().queue.len()
    }

    pub fn metrics(&self) -> &GuardMetrics {
        &self.metrics
    }
}

impl Drop for RuntimeGuard {
    fn drop(&mut self) {
        if self.admission.get_mut().phase == Phase::Ready {
            debug!("Stopping embedded runtime on guard drop");
            self.runtime.get_mut().stop();
        }
    }
}

impl fmt::Debug for RuntimeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let admission = self.admission.lock();
        f.debug_struct("RuntimeGuard")
            .field("phase", &admission.phase)
            .field("held", &admission.held)
            .field("waiting", &admission.queue.len())
            .finish()
    }
}

/// Proof of exclusive access to the embedded runtime.
///
/// Borrowed from its guard, so it cannot outlive it, and not `Send`, so it
/// cannot be handed to another thread. Dropping it releases the runtime.
pub struct ExecutionToken<'a> {
    guard: &'a RuntimeGuard,
    runtime: Option<MutexGuard<'a, Box<dyn EmbeddedRuntime>>>,
}

impl ExecutionToken<'_> {
    /// Invoke the runtime's translation entry point.
    pub fn call(&mut self, request: &[u8], context: &[u8]) -> Result<Vec<u8>, RuntimeFault> {
        let Some(runtime) = self.runtime.as_mut() else {
            return Err(RuntimeFault::new(-1, "execution token already released"));
        };
        let result = runtime.call(request, context);
        self.guard.metrics.record_call(result.is_err());
        result
    }

    /// Release explicitly. Equivalent to dropping the token.
    pub fn release(self) {}
}

impl Drop for ExecutionToken<'_> {
    fn drop(&mut self) {
        // Unlock the runtime before admitting the next holder
        self.runtime.take();
        self.guard.release();
    }
}

impl fmt::Debug for ExecutionToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionToken").finish_non_exhaustive()
    }
}
