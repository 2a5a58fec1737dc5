/// Tokenizer capability interface.
///
/// A tokenizer turns a text into a stream of tokens, each carrying flags and
/// the byte range it covers in the original text. Tokenizers are built by
/// named factories (see `registry`) and released by `Drop`.
use crate::error::Result;
use crate::fts::registry::TokenizerRegistry;
use crate::types::{TokenFlags, TokenizeFlags};

/// One token as seen by a callback. `text` may differ from
/// `input[start..end]` when the producing tokenizer folds case or strips
/// diacritics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub flags: TokenFlags,
    pub text: &'a [u8],
    pub start: usize,
    pub end: usize,
}

/// Downstream sink. Returning `Err` aborts tokenization and the error is
/// returned unchanged from `Tokenizer::tokenize`.
pub type TokenCallback<'a> = dyn FnMut(Token<'_>) -> Result<()> + 'a;

pub trait Tokenizer {
    /// Invoke `on_token` once per produced token, in input order.
    fn tokenize(
        &self,
        flags: TokenizeFlags,
        text: &[u8],
        on_token: &mut TokenCallback<'_>,
    ) -> Result<()>;
}

/// Builds tokenizer instances from construction arguments.
///
/// The registry is passed in so wrapping tokenizers can resolve their base
/// tokenizer by name.
pub trait TokenizerFactory: Send + Sync {
    fn create(&self, registry: &TokenizerRegistry, args: &[&str]) -> Result<Box<dyn Tokenizer>>;
}

impl<F> TokenizerFactory for F
where
    F: Fn(&TokenizerRegistry, &[&str]) -> Result<Box<dyn Tokenizer>> + Send + Sync,
{
    fn create(&self, registry: &TokenizerRegistry, args: &[&str]) -> Result<Box<dyn Tokenizer>> {
        self(registry, args)
    }
}

impl<T: Tokenizer + ?Sized> Tokenizer for Box<T> {
    fn tokenize(
        &self,
        flags: TokenizeFlags,
        text: &[u8],
        on_token: &mut TokenCallback<'_>,
    ) -> Result<()> {
        (**self).tokenize(flags, text, on_token)
    }
}

/// Owned copy of a `Token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub flags: TokenFlags,
    pub text: Vec<u8>,
    pub start: usize,
    pub end: usize,
}

impl OwnedToken {
    /// Token text, lossily converted for display.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.text).into_owned()
    }
}

impl From<Token<'_>> for OwnedToken {
    fn from(token: Token<'_>) -> Self {
        OwnedToken {
            flags: token.flags,
            text: token.text.to_vec(),
            start: token.start,
            end: token.end,
        }
    }
}

/// Run `tokenizer` over `text` and collect every token.
pub fn collect_tokens(
    tokenizer: &dyn Tokenizer,
    flags: TokenizeFlags,
    text: &[u8],
) -> Result<Vec<OwnedToken>> {
    let mut tokens = Vec::new();
    tokenizer.tokenize(flags, text, &mut |token| {
        tokens.push(OwnedToken::from(token));
        Ok(())
    })?;
    Ok(tokens)
}

/// Parse `key value` argument pairs shared by the built-in base tokenizers.
pub(crate) fn parse_option_pairs<'a>(args: &[&'a str]) -> Result<Vec<(&'a str, &'a str)>> {
    if args.len() % 2 != 0 {
        return Err(crate::error::NgramError::InvalidArgument(format!(
            "expected key/value pairs, got {} argument(s)",
            args.len()
        )));
    }
    Ok(args.chunks(2).map(|pair| (pair[0], pair[1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NgramError;

    /// Splits on spaces without folding.
    struct SpaceTokenizer;

    impl Tokenizer for SpaceTokenizer {
        fn tokenize(
            &self,
            _flags: TokenizeFlags,
            text: &[u8],
            on_token: &mut TokenCallback<'_>,
        ) -> Result<()> {
            let mut start = 0;
            for (i, &b) in text.iter().enumerate().chain(std::iter::once((text.len(), &b' '))) {
                if b == b' ' {
                    if i > start {
                        on_token(Token {
                            flags: TokenFlags::NONE,
                            text: &text[start..i],
                            start,
                            end: i,
                        })?;
                    }
                    start = i + 1;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_collect_tokens() {
        let tokens = collect_tokens(&SpaceTokenizer, TokenizeFlags::DOCUMENT, b"ab  cd").unwrap();
        let spans: Vec<(usize, usize)> = tokens.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(spans, vec![(0, 2), (4, 6)]);
        assert_eq!(tokens[1].text_lossy(), "cd");
    }

    #[test]
    fn test_callback_error_propagates() {
        let mut seen = 0;
        let err = SpaceTokenizer
            .tokenize(TokenizeFlags::DOCUMENT, b"a b c", &mut |_| {
                seen += 1;
                Err(NgramError::Callback("stop".into()))
            })
            .unwrap_err();
        assert!(matches!(err, NgramError::Callback(ref m) if m == "stop"));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_parse_option_pairs() {
        let pairs = parse_option_pairs(&["remove_diacritics", "2", "tokenchars", "-"]).unwrap();
        assert_eq!(pairs, vec![("remove_diacritics", "2"), ("tokenchars", "-")]);
        assert!(matches!(
            parse_option_pairs(&["tokenchars"]),
            Err(NgramError::InvalidArgument(_))
        ));
    }
}
