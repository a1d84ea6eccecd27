//! Translator registry: backends keyed by name.
//!
//! The registry owns shared handles to every backend the host can dispatch
//! to. The first backend registered becomes the default unless another one
//! is chosen explicitly.

use super::Translator;
use crate::error::TranslationError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default, Clone)]
pub struct TranslatorRegistry {
    backends: BTreeMap<String, Arc<dyn Translator>>,
    default: Option<String>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own name, replacing any previous one.
    pub fn register(&mut self, translator: impl Translator + 'static) -> &mut Self {
        self.register_shared(Arc::new(translator))
    }

    pub fn register_shared(&mut self, translator: Arc<dyn Translator>) -> &mut Self {
        let name = translator.name().to_string();
        debug!("Registering translator backend '{}'", name);
        if self.default.is_none() {
            self.default = Some(name.clone());
        }
        self.backends.insert(name, translator);
        self
    }

    /// Choose the backend used when a request names none.
    ///
    /// # Errors
    /// `UnknownBackend` if nothing is registered under `name`.
    pub fn set_default(&mut self, name: &str) -> Result<(), TranslationError> {
        if !self.backends.contains_key(name) {
            return Err(TranslationError::UnknownBackend(name.to_string()));
        }
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Translator>> {
        self.backends.get(name).cloned()
    }

    /// Resolve a backend by name, or the default when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn Translator>, TranslationError> {
        match name {
            Some(name) => self
                .get(name)
                .ok_or_else(|| TranslationError::UnknownBackend(name.to_string())),
            None => self
                .default
                .as_deref()
                .and_then(|name| self.get(name))
                .ok_or(TranslationError::NoDefaultBackend),
        }
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Registered backend names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("backends", &self.names())
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Context, Text};
    use crate::translation::IdentityTranslator;

    struct Shouting;

    impl Translator for Shouting {
        fn name(&self) -> &str {
            "shout"
        }

        fn translate(&self, text: &Text, _context: &Context) -> Result<Text, TranslationError> {
            let s = text.to_string_checked()?;
            Ok(Text::from(s.to_uppercase()))
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = TranslatorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.default_name().is_none());
        assert_eq!(
            registry.resolve(None).err(),
            Some(TranslationError::NoDefaultBackend)
        );
    }

    #[test]
    fn test_first_registered_is_default() {
        let mut registry = TranslatorRegistry::new();
        registry.register(IdentityTranslator).register(Shouting);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default_name(), Some("identity"));
        assert_eq!(registry.resolve(None).unwrap().name(), "identity");
    }

    #[test]
    fn test_resolve_by_name() {
        let mut registry = TranslatorRegistry::new();
        registry.register(IdentityTranslator).register(Shouting);

        let backend = registry.resolve(Some("shout")).unwrap();
        let out = backend
            .translate(&Text::from("hi"), &Context::new("en", "en"))
            .unwrap();
        assert_eq!(out, Text::from("HI"));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = TranslatorRegistry::new();
        assert_eq!(
            registry.resolve(Some("deepl")).err(),
            Some(TranslationError::UnknownBackend("deepl".to_string()))
        );
    }

    #[test]
    fn test_set_default() {
        let mut registry = TranslatorRegistry::new();
        registry.register(IdentityTranslator).register(Shouting);

        registry.set_default("shout").unwrap();
        assert_eq!(registry.default_name(), Some("shout"));
        assert!(registry.set_default("missing").is_err());
        assert_eq!(registry.default_name(), Some("shout"));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = TranslatorRegistry::new();
        registry.register(Shouting).register(IdentityTranslator);
        assert_eq!(registry.names(), vec!["identity", "shout"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = TranslatorRegistry::new();
        registry.register(IdentityTranslator).register(IdentityTranslator);
        assert_eq!(registry.len(), 1);
    }
}
