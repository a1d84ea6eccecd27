//! Request dispatch: picks a backend for each call and owns the retry policy.
//!
//! Backends never retry on their own; the dispatcher decides whether a
//! failure is worth another attempt based on its [`ErrorKind`](crate::error::ErrorKind).

use super::{CancelFlag, TranslatorRegistry};
use crate::error::TranslationError;
use crate::retry::{with_retry_if, RetryConfig};
use crate::text::{Context, Text};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: TranslatorRegistry,
    retry: RetryConfig,
}

impl Dispatcher {
    pub fn new(registry: TranslatorRegistry) -> Self {
        Self {
            registry,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &TranslatorRegistry {
        &self.registry
    }

    /// Translate with the named backend, or the default one.
    ///
    /// Blocks the calling thread for as long as the backend does.
    pub fn translate(
        &self,
        backend: Option<&str>,
        text: &Text,
        context: &Context,
    ) -> Result<Text, TranslationError> {
        self.translate_cancellable(backend, text, context, &CancelFlag::new())
    }

    /// [`translate`](Self::translate) that stops with `Cancelled` once
    /// `cancel` is set, unless the runtime has already been entered.
    pub fn translate_cancellable(
        &self,
        backend: Option<&str>,
        text: &Text,
        context: &Context,
        cancel: &CancelFlag,
    ) -> Result<Text, TranslationError> {
        let translator = self.registry.resolve(backend)?;
        debug!(
            "Dispatching {} code units to '{}' ({})",
            text.len(),
            translator.name(),
            context.pair()
        );

        with_retry_if(
            &self.retry,
            &format!("Translation via '{}'", translator.name()),
            || translator.translate_cancellable(text, context, cancel),
            TranslationError::is_retryable,
        )
        .inspect_err(|e| warn!("Translation via '{}' failed: {}", translator.name(), e))
    }

    /// Async bridge for hosts running on tokio.
    ///
    /// The blocking call runs on tokio's blocking pool so it never stalls an
    /// async worker. Dropping the returned future cancels the request: a
    /// worker still queued on the runtime gives up once admitted. A call
    /// already inside the runtime runs to completion.
    pub async fn translate_async(
        self: Arc<Self>,
        backend: Option<String>,
        text: Text,
        context: Context,
    ) -> Result<Text, TranslationError> {
        let cancel = CancelFlag::new();
        let _cancel_on_drop = CancelOnDrop(cancel.clone());

        let backend_name = backend.clone();
        tokio::task::spawn_blocking(move || {
            self.translate_cancellable(backend.as_deref(), &text, &context, &cancel)
        })
        .await
        .unwrap_or_else(|e| {
            Err(TranslationError::backend(
                backend_name.as_deref().unwrap_or("default"),
                format!("translation task failed: {}", e),
            ))
        })
    }
}

/// Sets the flag when the async caller's future goes away.
struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::translation::{IdentityTranslator, Translator};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails `failures` times with the given error, then echoes.
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
        error: TranslationError,
    }

    impl Flaky {
        fn new(failures: usize, error: TranslationError) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
                error,
            }
        }
    }

    impl Translator for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn translate(&self, text: &Text, _context: &Context) -> Result<Text, TranslationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(self.error.clone());
            }
            Ok(text.clone())
        }
    }

    fn fast_retry(attempts: u32) -> RetryConfig {
        RetryConfig::new(attempts, Duration::from_millis(1))
    }

    fn dispatcher_with(flaky: Arc<Flaky>, retry: RetryConfig) -> Dispatcher {
        let mut registry = TranslatorRegistry::new();
        registry.register_shared(flaky);
        registry.register(IdentityTranslator);
        Dispatcher::new(registry).with_retry(retry)
    }

    #[test]
    fn test_dispatch_to_default() {
        let mut registry = TranslatorRegistry::new();
        registry.register(IdentityTranslator);
        let dispatcher = Dispatcher::new(registry);

        let out = dispatcher
            .translate(None, &Text::from("hola"), &Context::new("es", "es"))
            .unwrap();
        assert_eq!(out, Text::from("hola"));
    }

    #[test]
    fn test_dispatch_unknown_backend() {
        let dispatcher = Dispatcher::new(TranslatorRegistry::new());
        let err = dispatcher
            .translate(Some("deepl"), &Text::from("hi"), &Context::new("en", "fr"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Misconfigured);
    }

    #[test]
    fn test_no_retry_by_default() {
        let flaky = Arc::new(Flaky::new(1, TranslationError::backend("flaky", "down")));
        let dispatcher = dispatcher_with(flaky.clone(), RetryConfig::default());

        let err = dispatcher
            .translate(Some("flaky"), &Text::from("hi"), &Context::new("en", "fr"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retries_backend_errors() {
        let flaky = Arc::new(Flaky::new(2, TranslationError::backend("flaky", "down")));
        let dispatcher = dispatcher_with(flaky.clone(), fast_retry(3));

        let out = dispatcher
            .translate(Some("flaky"), &Text::from("hi"), &Context::new("en", "fr"))
            .unwrap();
        assert_eq!(out, Text::from("hi"));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_does_not_retry_not_ready() {
        let flaky = Arc::new(Flaky::new(
            5,
            TranslationError::Guard(crate::error::GuardError::NotInitialized),
        ));
        let dispatcher = dispatcher_with(flaky.clone(), fast_retry(3));

        let err = dispatcher
            .translate(Some("flaky"), &Text::from("hi"), &Context::new("en", "fr"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancelled_request_is_not_retried() {
        let flaky = Arc::new(Flaky::new(0, TranslationError::backend("flaky", "down")));
        let dispatcher = dispatcher_with(flaky.clone(), fast_retry(3));
        let cancel = CancelFlag::new();
        cancel.cancel();

        let err = dispatcher
            .translate_cancellable(
                Some("flaky"),
                &Text::from("hi"),
                &Context::new("en", "fr"),
                &cancel,
            )
            .unwrap_err();
        assert_eq!(err, TranslationError::Cancelled);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translate_async() {
        let mut registry = TranslatorRegistry::new();
        registry.register(IdentityTranslator);
        let dispatcher = Arc::new(Dispatcher::new(registry));

        let out = dispatcher
            .translate_async(None, Text::from("async"), Context::new("en", "en"))
            .await
            .unwrap();
        assert_eq!(out, Text::from("async"));
    }

    #[tokio::test]
    async fn test_translate_async_propagates_errors() {
        let dispatcher = Arc::new(Dispatcher::new(TranslatorRegistry::new()));
        let err = dispatcher
            .translate_async(
                Some("missing".to_string()),
                Text::from("x"),
                Context::new("en", "fr"),
            )
            .await
            .unwrap_err();
        assert_eq!(err, TranslationError::UnknownBackend("missing".to_string()));
    }
}
