use super::{CancelFlag, Translator};
use crate::codec::TextCodec;
use crate::error::TranslationError;
use crate::runtime::RuntimeGuard;
use crate::text::{Context, Text};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Backend that translates through the embedded runtime.
///
/// Holds a shared reference to the process-wide guard rather than owning a
/// runtime, so any number of instances contend for the same interpreter.
#[derive(Debug, Clone)]
pub struct ApiTranslator {
    guard: Arc<RuntimeGuard>,
    acquire_timeout: Option<Duration>,
}

impl ApiTranslator {
    pub const NAME: &'static str = "api";

    pub fn new(guard: Arc<RuntimeGuard>) -> Self {
        Self {
            guard,
            acquire_timeout: None,
        }
    }

    /// Bound the wait for the runtime; expiry surfaces as a timeout error.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    pub fn guard(&self) -> &Arc<RuntimeGuard> {
        &self.guard
    }
}

impl ApiTranslator {
    fn run(
        &self,
        text: &Text,
        context: &Context,
        cancel: Option<&CancelFlag>,
    ) -> Result<Text, TranslationError> {
        // Nothing to translate, so don't touch the guard
        if text.is_empty() {
            return Ok(Text::empty());
        }

        let request = TextCodec::encode(text)?;
        let context_bytes = context
            .to_json_bytes()
            .map_err(|e| TranslationError::backend(Self::NAME, format!("bad context: {}", e)))?;

        let mut token = match self.acquire_timeout {
            Some(timeout) => self.guard.acquire_timeout(timeout)?,
            None => self.guard.acquire()?,
        };

        // The caller may have left while we were queued
        if let Some(cancel) = cancel {
            if cancel.is_cancelled() {
                drop(token);
                debug!("Dropping cancelled request for {}", context.pair());
                return Err(TranslationError::Cancelled);
            }
        }

        debug!(
            "Translating {} code units ({})",
            text.len(),
            context.pair()
        );
        let response = token.call(&request, &context_bytes).map_err(|fault| {
            warn!("Embedded runtime failed for {}: {}", context.pair(), fault);
            TranslationError::backend(Self::NAME, fault.to_string())
        })?;
        drop(token);

        Ok(TextCodec::decode(&response)?)
    }
}

impl Translator for ApiTranslator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn translate(&self, text: &Text, context: &Context) -> Result<Text, TranslationError> {
        self.run(text, context, None)
    }

    fn translate_cancellable(
        &self,
        text: &Text,
        context: &Context,
        cancel: &CancelFlag,
    ) -> Result<Text, TranslationError> {
        cancel.check()?;
        self.run(text, context, Some(cancel))
    }
}
