//! Error taxonomy shared by the guard, the codec and every translator backend.
//!
//! Callers of [`Translator::translate`](crate::translation::Translator::translate)
//! only ever see [`TranslationError`]; runtime-specific failures are wrapped
//! before they cross the backend boundary.

use std::time::Duration;
use thiserror::Error;

/// Lifecycle and acquisition failures of the runtime guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("embedded runtime has not been initialized")]
    NotInitialized,

    #[error("embedded runtime is already initialized")]
    AlreadyInitialized,

    #[error("embedded runtime failed to start: {detail}")]
    InitializationFailed { detail: String },

    #[error("timed out after {waited:?} waiting for the embedded runtime")]
    AcquireTimeout { waited: Duration },

    #[error("embedded runtime is in use")]
    Busy,

    #[error("embedded runtime has been shut down")]
    ShutDown,

    #[error("a process-wide runtime guard is already installed")]
    GlobalAlreadyInstalled,
}

/// Malformed text detected at the codec boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid text: unpaired surrogate {unit:#06x} at index {index}")]
    UnpairedSurrogate { index: usize, unit: u16 },

    #[error("invalid text: runtime returned malformed UTF-8 after {valid_up_to} bytes")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Failure reported by the embedded runtime's entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("runtime fault {code}: {message}")]
pub struct RuntimeFault {
    pub code: i32,
    pub message: String,
}

impl RuntimeFault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Coarse classification of a [`TranslationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend could not produce a translation for this input.
    Backend,
    /// The input (or the runtime's output) was not well-formed text.
    InvalidText,
    /// The system is not ready: runtime missing, shut down or busy.
    NotReady,
    /// A bounded wait for the runtime expired.
    Timeout,
    /// The request named a backend that does not exist.
    Misconfigured,
    /// The caller gave up before the runtime was entered.
    Cancelled,
}

/// The only error type returned at the translator boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("backend '{backend}' could not translate: {detail}")]
    Backend { backend: String, detail: String },

    #[error(transparent)]
    InvalidText(#[from] CodecError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("unknown translator backend: '{0}'")]
    UnknownBackend(String),

    #[error("no default translator backend is registered")]
    NoDefaultBackend,

    #[error("translation request was cancelled before reaching the runtime")]
    Cancelled,
}

impl TranslationError {
    pub fn backend(backend: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Backend { .. } => ErrorKind::Backend,
            Self::InvalidText(_) => ErrorKind::InvalidText,
            Self::Guard(GuardError::AcquireTimeout { .. }) => ErrorKind::Timeout,
            Self::Guard(GuardError::GlobalAlreadyInstalled)
            | Self::UnknownBackend(_)
            | Self::NoDefaultBackend => ErrorKind::Misconfigured,
            Self::Guard(_) => ErrorKind::NotReady,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Only transient failures are worth another attempt; malformed input and
    /// misconfiguration fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Backend | ErrorKind::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_kind() {
        let err = TranslationError::backend("api", "runtime fault 2: no glossary");
        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("backend 'api'"));
    }

    #[test]
    fn test_guard_errors_are_not_ready() {
        for guard_err in [
            GuardError::NotInitialized,
            GuardError::ShutDown,
            GuardError::Busy,
            GuardError::InitializationFailed {
                detail: "boom".to_string(),
            },
        ] {
            let err = TranslationError::from(guard_err);
            assert_eq!(err.kind(), ErrorKind::NotReady);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = TranslationError::from(GuardError::AcquireTimeout {
            waited: Duration::from_millis(50),
        });
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_text_not_retryable() {
        let err = TranslationError::from(CodecError::UnpairedSurrogate {
            index: 3,
            unit: 0xD800,
        });
        assert_eq!(err.kind(), ErrorKind::InvalidText);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("0xd800"));
    }

    #[test]
    fn test_misconfigured_kinds() {
        assert_eq!(
            TranslationError::UnknownBackend("deepl".to_string()).kind(),
            ErrorKind::Misconfigured
        );
        assert_eq!(TranslationError::NoDefaultBackend.kind(), ErrorKind::Misconfigured);
    }

    #[test]
    fn test_cancelled_is_final() {
        let err = TranslationError::Cancelled;
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_second_global_install_is_misconfiguration() {
        let err = TranslationError::from(GuardError::GlobalAlreadyInstalled);
        assert_eq!(err.kind(), ErrorKind::Misconfigured);
        assert!(err.to_string().contains("already installed"));
    }

    #[test]
    fn test_runtime_fault_display() {
        let fault = RuntimeFault::new(2, "no glossary for en:de");
        assert_eq!(fault.to_string(), "runtime fault 2: no glossary for en:de");
    }
}
