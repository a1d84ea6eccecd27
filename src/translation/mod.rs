//! Translator backends behind one polymorphic contract.
//!
//! # Architecture
//!
//! - `api`: backend that delegates to the guarded embedded runtime
//! - `identity`: stateless backend that returns its input unchanged
//! - `registry`: backends keyed by name, with a default
//! - `dispatcher`: resolves a backend per request and applies the retry policy
//!
//! A [`CancelFlag`] lets an abandoned request stop before it reaches the
//! embedded runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use trnist::translation::{ApiTranslator, Dispatcher, TranslatorRegistry};
//!
//! let mut registry = TranslatorRegistry::new();
//! registry.register(ApiTranslator::new(guard))?;
//! let dispatcher = Dispatcher::new(registry);
//! let out = dispatcher.translate(None, &"hello".into(), &Context::new("en", "fr"))?;
//! ```

mod api;
mod dispatcher;
mod identity;
mod registry;

pub use api::ApiTranslator;
pub use dispatcher::Dispatcher;
pub use identity::IdentityTranslator;
pub use registry::TranslatorRegistry;

use crate::error::TranslationError;
use crate::text::{Context, Text};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag telling a backend that its caller has gone away.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is set.
    pub fn check(&self) -> Result<(), TranslationError> {
        if self.is_cancelled() {
            return Err(TranslationError::Cancelled);
        }
        Ok(())
    }
}

/// A translation backend.
///
/// Implementations are shared across threads; any state they keep must be
/// internally synchronized. `context` is borrowed for the call only.
pub trait Translator: Send + Sync {
    /// Name the backend is registered under.
    fn name(&self) -> &str;

    /// Translate `text` according to `context`.
    ///
    /// Never returns partially translated text: either the whole result or a
    /// [`TranslationError`].
    fn translate(&self, text: &Text, context: &Context) -> Result<Text, TranslationError>;

    /// Like [`translate`](Self::translate), but give up with
    /// [`TranslationError::Cancelled`] if `cancel` is set before any work
    /// that cannot be abandoned has started.
    fn translate_cancellable(
        &self,
        text: &Text,
        context: &Context,
        cancel: &CancelFlag,
    ) -> Result<Text, TranslationError> {
        cancel.check()?;
        self.translate(text, context)
    }
}
