/// `ascii` base tokenizer.
///
/// ASCII alphanumerics and every byte >= 0x80 are token bytes; other ASCII
/// bytes separate. ASCII letters are lower-cased, everything else passes
/// through untouched, so invalid UTF-8 reaches the next stage as-is.
use crate::error::{NgramError, Result};
use crate::fts::registry::TokenizerRegistry;
use crate::fts::tokenizer::{parse_option_pairs, Token, TokenCallback, Tokenizer, TokenizerFactory};
use crate::types::{TokenFlags, TokenizeFlags};

#[derive(Debug, Clone)]
pub struct AsciiTokenizer {
    /// Classification of the 128 ASCII bytes.
    token_bytes: [bool; 128],
}

impl Default for AsciiTokenizer {
    fn default() -> Self {
        let mut token_bytes = [false; 128];
        for (b, slot) in token_bytes.iter_mut().enumerate() {
            *slot = (b as u8).is_ascii_alphanumeric();
        }
        AsciiTokenizer { token_bytes }
    }
}

impl AsciiTokenizer {
    pub fn new() -> Self {
        AsciiTokenizer::default()
    }

    /// `tokenchars` / `separators`; non-ASCII characters in the values are
    /// ignored.
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let mut tokenizer = AsciiTokenizer::new();
        for (key, value) in parse_option_pairs(args)? {
            let is_token = match key {
                "tokenchars" => true,
                "separators" => false,
                other => {
                    return Err(NgramError::InvalidArgument(format!(
                        "unknown ascii option {:?}",
                        other
                    )))
                }
            };
            for b in value.bytes().filter(u8::is_ascii) {
                tokenizer.token_bytes[b as usize] = is_token;
            }
        }
        Ok(tokenizer)
    }

    fn is_token_byte(&self, b: u8) -> bool {
        b >= 0x80 || self.token_bytes[b as usize]
    }
}

impl Tokenizer for AsciiTokenizer {
    fn tokenize(
        &self,
        _flags: TokenizeFlags,
        text: &[u8],
        on_token: &mut TokenCallback<'_>,
    ) -> Result<()> {
        let mut folded = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            while pos < text.len() && !self.is_token_byte(text[pos]) {
                pos += 1;
            }
            let start = pos;
            while pos < text.len() && self.is_token_byte(text[pos]) {
                folded.push(text[pos].to_ascii_lowercase());
                pos += 1;
            }
            if pos > start {
                on_token(Token {
                    flags: TokenFlags::NONE,
                    text: &folded,
                    start,
                    end: pos,
                })?;
                folded.clear();
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFactory;

impl TokenizerFactory for AsciiFactory {
    fn create(&self, _registry: &TokenizerRegistry, args: &[&str]) -> Result<Box<dyn Tokenizer>> {
        Ok(Box::new(AsciiTokenizer::from_args(args)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fts::tokenizer::collect_tokens;

    fn texts(tokenizer: &AsciiTokenizer, text: &[u8]) -> Vec<Vec<u8>> {
        collect_tokens(tokenizer, TokenizeFlags::DOCUMENT, text)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_ascii_split_and_fold() {
        let tok = AsciiTokenizer::new();
        assert_eq!(texts(&tok, b"Hello, World"), vec![b"hello".to_vec(), b"world".to_vec()]);
    }

    #[test]
    fn test_non_ascii_is_token() {
        let tok = AsciiTokenizer::new();
        assert_eq!(texts(&tok, "Ünï code".as_bytes()), vec!["Ünï".as_bytes().to_vec(), b"code".to_vec()]);
    }

    #[test]
    fn test_invalid_bytes_pass_through() {
        let tok = AsciiTokenizer::new();
        assert_eq!(texts(&tok, &[b'A', 0xFF, b' ', b'b']), vec![vec![b'a', 0xFF], vec![b'b']]);
    }

    #[test]
    fn test_options() {
        let tok = AsciiTokenizer::from_args(&["tokenchars", "#", "separators", "e"]).unwrap();
        assert_eq!(texts(&tok, b"c#def"), vec![b"c#d".to_vec(), b"f".to_vec()]);
        assert!(AsciiTokenizer::from_args(&["stem", "1"]).is_err());
    }
}
