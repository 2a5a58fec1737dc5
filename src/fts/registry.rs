/// Named tokenizer registry.
///
/// Plays the role of the host's tokenizer table: factories are registered
/// under a name and instances are created by name with construction
/// arguments. Wrapping tokenizers (such as `ngram`) receive the registry so
/// they can resolve their base tokenizer the same way.
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NgramError, Result};
use crate::fts::ascii::AsciiFactory;
use crate::fts::ngram::{NgramConfig, NgramFactory};
use crate::fts::tokenizer::{Tokenizer, TokenizerFactory};
use crate::fts::unicode61::Unicode61Factory;

#[derive(Clone, Default)]
pub struct TokenizerRegistry {
    factories: HashMap<String, Arc<dyn TokenizerFactory>>,
}

impl TokenizerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        TokenizerRegistry {
            factories: HashMap::new(),
        }
    }

    /// Registry with `unicode61`, `ascii` and `ngram` (default config).
    pub fn with_builtins() -> Self {
        Self::with_ngram_config(NgramConfig::default())
    }

    /// Registry with the built-ins, `ngram` using `config`.
    pub fn with_ngram_config(config: NgramConfig) -> Self {
        let mut registry = TokenizerRegistry::new();
        registry.register("unicode61", Unicode61Factory);
        registry.register("ascii", AsciiFactory);
        registry.register("ngram", NgramFactory::new(config));
        registry
    }

    /// Register `factory` under `name`, returning the factory it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl TokenizerFactory + 'static,
    ) -> Option<Arc<dyn TokenizerFactory>> {
        self.factories.insert(name.into(), Arc::new(factory))
    }

    pub fn find(&self, name: &str) -> Result<Arc<dyn TokenizerFactory>> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| NgramError::TokenizerNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Resolve `name` and instantiate it with `args`.
    ///
    /// Nothing is retained when resolution or instantiation fails; a
    /// wrapper whose base fails to build is dropped along with it.
    pub fn create(&self, name: &str, args: &[&str]) -> Result<Box<dyn Tokenizer>> {
        let factory = self.find(name)?;
        match factory.create(self, args) {
            Ok(tokenizer) => {
                tracing::debug!(name, nargs = args.len(), "created tokenizer");
                Ok(tokenizer)
            }
            Err(err) => {
                tracing::debug!(name, error = %err, "tokenizer creation failed");
                Err(err)
            }
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for TokenizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fts::tokenizer::{collect_tokens, TokenCallback};
    use crate::types::TokenizeFlags;

    struct Nothing;

    impl Tokenizer for Nothing {
        fn tokenize(&self, _: TokenizeFlags, _: &[u8], _: &mut TokenCallback<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = TokenizerRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["ascii", "ngram", "unicode61"]);
    }

    #[test]
    fn test_unknown_tokenizer() {
        let registry = TokenizerRegistry::with_builtins();
        let err = registry.create("porter", &[]).err().unwrap();
        assert!(matches!(err, NgramError::TokenizerNotFound(ref n) if n == "porter"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TokenizerRegistry::with_builtins();
        let nothing = |_: &TokenizerRegistry, _: &[&str]| -> Result<Box<dyn Tokenizer>> {
            Ok(Box::new(Nothing))
        };
        assert!(registry.register("ascii", nothing).is_some());
        assert!(registry.register("nothing", nothing).is_none());

        let tok = registry.create("ascii", &[]).unwrap();
        let tokens = collect_tokens(tok.as_ref(), TokenizeFlags::DOCUMENT, b"hello").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let registry = TokenizerRegistry::new();
        assert!(!registry.contains("unicode61"));
        assert!(registry.names().is_empty());
    }
}
