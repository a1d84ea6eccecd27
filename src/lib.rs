//! Text translation host with interchangeable backends.
//!
//! Backends implement [`translation::Translator`]. The runtime-backed
//! [`translation::ApiTranslator`] reaches a single-threaded embedded runtime
//! through the process-wide [`runtime::RuntimeGuard`], which serializes every
//! call into it.

pub mod codec;
pub mod config;
pub mod error;
pub mod retry;
pub mod runtime;
pub mod text;
pub mod translation;

pub use error::{CodecError, ErrorKind, GuardError, RuntimeFault, TranslationError};
pub use text::{Context, Text};
