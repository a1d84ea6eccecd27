//! Embedded runtime access.
//!
//! The embedded runtime is single-threaded and stateful. Every entry into it
//! goes through the process-wide [`RuntimeGuard`], which owns the runtime's
//! lifecycle and hands out one [`ExecutionToken`] at a time.
//!
//! # Architecture
//!
//! - `guard`: lifecycle (initialize once, shut down once) and FIFO scoped acquisition
//! - `metrics`: per-guard acquisition and call counters
//! - `glossary`: built-in glossary-backed runtime used by the binary and tests
//!
//! # Example
//!
//! ```rust,ignore
//! use trnist::runtime::{GlossaryRuntime, RuntimeGuard};
//!
//! let guard = RuntimeGuard::new(GlossaryRuntime::from_path("glossary.json"));
//! guard.initialize()?;
//! let mut token = guard.acquire()?;
//! let out = token.call(b"hello", br#"{"source":"en","target":"fr"}"#)?;
//! ```

mod glossary;
mod guard;
mod metrics;

pub use glossary::GlossaryRuntime;
pub use guard::{ExecutionToken, RuntimeGuard};
pub use metrics::{GuardMetrics, GuardMetricsReport};

use crate::error::RuntimeFault;

/// The call surface of an embedded, single-threaded runtime.
///
/// Implementations are only ever driven by one thread at a time (the guard
/// enforces it), so they need `Send` but not `Sync`.
pub trait EmbeddedRuntime: Send {
    /// Bring the runtime up. Called exactly once, by `RuntimeGuard::initialize`.
    fn start(&mut self) -> Result<(), RuntimeFault>;

    /// The translation entry point: encoded request text plus serialized
    /// context in, encoded result text out.
    fn call(&mut self, request: &[u8], context: &[u8]) -> Result<Vec<u8>, RuntimeFault>;

    /// Tear the runtime down. Called at most once, by `RuntimeGuard::shutdown`.
    fn stop(&mut self);
}
