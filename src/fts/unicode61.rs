/// `unicode61` base tokenizer: Unicode-aware word split, lower-casing and
/// diacritic removal.
///
/// Token characters are alphanumeric codepoints and combining marks;
/// everything else separates tokens. `tokenchars` / `separators` override
/// the classification per character.
///
/// Diacritics are only removed from codepoints below U+2000 (Latin, Greek,
/// Cyrillic and friends); kana voicing marks and the like are kept.
///
/// Input: "Crème  BRÛLÉE!" → ["creme" @0..6, "brulee" @8..16]
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

use crate::error::{NgramError, Result};
use crate::fts::registry::TokenizerRegistry;
use crate::fts::tokenizer::{parse_option_pairs, Token, TokenCallback, Tokenizer, TokenizerFactory};
use crate::types::{TokenFlags, TokenizeFlags};
use crate::utf8::decoder::{DecodeStep, Utf8Decoder};

const DIACRITIC_FOLD_LIMIT: u32 = 0x2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoveDiacritics {
    /// `remove_diacritics 0`
    Keep,
    /// `remove_diacritics 1`: only from codepoints carrying one diacritic.
    #[default]
    Simple,
    /// `remove_diacritics 2`
    All,
}

impl RemoveDiacritics {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "0" => Ok(RemoveDiacritics::Keep),
            "1" => Ok(RemoveDiacritics::Simple),
            "2" => Ok(RemoveDiacritics::All),
            other => Err(NgramError::InvalidArgument(format!(
                "remove_diacritics must be 0, 1 or 2, got {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Unicode61Tokenizer {
    remove_diacritics: RemoveDiacritics,
    tokenchars: Vec<char>,
    separators: Vec<char>,
}

impl Unicode61Tokenizer {
    pub fn new() -> Self {
        Unicode61Tokenizer::default()
    }

    /// Build from `key value` pairs: `remove_diacritics`, `tokenchars`,
    /// `separators`.
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let mut tokenizer = Unicode61Tokenizer::new();
        for (key, value) in parse_option_pairs(args)? {
            match key {
                "remove_diacritics" => tokenizer.remove_diacritics = RemoveDiacritics::parse(value)?,
                "tokenchars" => tokenizer.tokenchars.extend(value.chars()),
                "separators" => tokenizer.separators.extend(value.chars()),
                other => {
                    return Err(NgramError::InvalidArgument(format!(
                        "unknown unicode61 option {:?}",
                        other
                    )))
                }
            }
        }
        Ok(tokenizer)
    }

    pub fn remove_diacritics(&self) -> RemoveDiacritics {
        self.remove_diacritics
    }

    fn is_token_char(&self, c: char) -> bool {
        if self.separators.contains(&c) {
            return false;
        }
        self.tokenchars.contains(&c) || c.is_alphanumeric() || is_combining_mark(c)
    }

    /// Append the folded form of `c` to `out`.
    fn fold_into(&self, c: char, out: &mut String) {
        for lower in c.to_lowercase() {
            if self.remove_diacritics == RemoveDiacritics::Keep || lower as u32 >= DIACRITIC_FOLD_LIMIT {
                out.push(lower);
                continue;
            }
            let mut base = String::new();
            let mut marks = 0usize;
            decompose_canonical(lower, |d| {
                if is_combining_mark(d) {
                    marks += 1;
                } else {
                    base.push(d);
                }
            });
            if marks == 0 || (marks > 1 && self.remove_diacritics == RemoveDiacritics::Simple) {
                out.push(lower);
            } else {
                out.push_str(&base);
            }
        }
    }
}

impl Tokenizer for Unicode61Tokenizer {
    fn tokenize(
        &self,
        _flags: TokenizeFlags,
        text: &[u8],
        on_token: &mut TokenCallback<'_>,
    ) -> Result<()> {
        let mut decoder = Utf8Decoder::new(text);
        let mut folded = String::new();
        let mut start = 0;
        let mut end = 0;
        let mut in_token = false;

        loop {
            let c = match decoder.next_step() {
                DecodeStep::Char(c) => c,
                DecodeStep::End => break,
                DecodeStep::Error(err) => {
                    return Err(NgramError::MalformedUtf8 {
                        offset: err.offset,
                        kind: err.kind,
                    })
                }
            };
            if self.is_token_char(c) {
                if !in_token {
                    in_token = true;
                    start = decoder.at_byte();
                }
                self.fold_into(c, &mut folded);
                end = decoder.index();
            } else if in_token {
                in_token = false;
                emit(&mut folded, start, end, on_token)?;
            }
        }
        if in_token {
            emit(&mut folded, start, end, on_token)?;
        }
        Ok(())
    }
}

/// Hand the accumulated token to `on_token` and clear it. A token whose
/// characters all folded away is dropped.
fn emit(folded: &mut String, start: usize, end: usize, on_token: &mut TokenCallback<'_>) -> Result<()> {
    if !folded.is_empty() {
        on_token(Token {
            flags: TokenFlags::NONE,
            text: folded.as_bytes(),
            start,
            end,
        })?;
    }
    folded.clear();
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Unicode61Factory;

impl TokenizerFactory for Unicode61Factory {
    fn create(&self, _registry: &TokenizerRegistry, args: &[&str]) -> Result<Box<dyn Tokenizer>> {
        Ok(Box::new(Unicode61Tokenizer::from_args(args)?))
    }
}
