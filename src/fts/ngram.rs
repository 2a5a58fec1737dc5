/// N-gram re-segmentation of base tokenizer output.
///
/// Every token from the base tokenizer is decoded and re-emitted as
/// overlapping grams:
/// - a pair of adjacent narrow codepoints (below `wide_threshold`) becomes
///   a bigram ending at the second codepoint;
/// - a codepoint in a pair where either side is wide is emitted alone.
/// The first codepoint is always emitted alone first, so "cat" yields
/// `c`, `ca`, `at` and "東京都" yields `東`, `京`, `都`.
///
/// Gram offsets are token-relative while scanning and are translated to
/// absolute input offsets (token start + relative) before reaching the
/// downstream callback.
use crate::error::{NgramError, Result};
use crate::fts::registry::TokenizerRegistry;
use crate::fts::tokenizer::{Token, TokenCallback, Tokenizer, TokenizerFactory};
use crate::types::TokenizeFlags;
use crate::utf8::decoder::{DecodeStep, Utf8Decoder, Utf8Error};

/// Codepoints below this value are narrow (bigram-indexed).
pub const DEFAULT_WIDE_THRESHOLD: u32 = 0x2000;

/// Base tokenizer wrapped when no name is given.
pub const DEFAULT_BASE_TOKENIZER: &str = "unicode61";

const ENV_WIDE_THRESHOLD: &str = "NGRAM_WIDE_THRESHOLD";
const ENV_SEED_FIRST: &str = "NGRAM_SEED_FIRST";

/// Segmentation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramConfig {
    pub wide_threshold: u32,
    /// Emit the first codepoint of every token as a standalone gram.
    pub seed_first: bool,
}

impl Default for NgramConfig {
    fn default() -> Self {
        NgramConfig {
            wide_threshold: DEFAULT_WIDE_THRESHOLD,
            seed_first: true,
        }
    }
}

impl NgramConfig {
    /// Defaults overridden by `NGRAM_WIDE_THRESHOLD` / `NGRAM_SEED_FIRST`.
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = NgramConfig::default();
        NgramConfig {
            wide_threshold: std::env::var(ENV_WIDE_THRESHOLD)
                .ok()
                .map(|raw| parse_threshold_env(&raw, defaults.wide_threshold))
                .unwrap_or(defaults.wide_threshold),
            seed_first: std::env::var(ENV_SEED_FIRST)
                .ok()
                .map(|raw| parse_bool_env(&raw, defaults.seed_first))
                .unwrap_or(defaults.seed_first),
        }
    }

    pub fn is_narrow(&self, c: char) -> bool {
        (c as u32) < self.wide_threshold
    }
}

fn parse_threshold_env(raw: &str, default: u32) -> u32 {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    match parsed {
        Ok(v) if (1..=0x110000).contains(&v) => v,
        Ok(v) => {
            tracing::warn!(
                value = v,
                default,
                "{} must be in 1..=0x110000, using default",
                ENV_WIDE_THRESHOLD
            );
            default
        }
        Err(_) => {
            tracing::warn!(
                value = raw,
                default,
                "{} must be an integer, using default",
                ENV_WIDE_THRESHOLD
            );
            default
        }
    }
}

fn parse_bool_env(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(value = raw, default, "{} must be a boolean, using default", ENV_SEED_FIRST);
            default
        }
    }
}

/// A gram as a byte range of the token buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gram {
    pub start: usize,
    pub end: usize,
    /// Width in codepoints: 1 or 2.
    pub width: u8,
}

impl Gram {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Start,
    /// Previous codepoint and the byte offset where it starts.
    Scanning { prev: char, prev_start: usize },
    Done,
}

/// Lazy gram stream over one token buffer.
///
/// Yields grams in order; on malformed input yields one `Err` and then
/// ends. Grams already yielded before the error stay valid.
pub struct Grams<'a> {
    decoder: Utf8Decoder<'a>,
    config: NgramConfig,
    state: ScanState,
    queued: Option<Gram>,
}

impl<'a> Grams<'a> {
    pub fn new(text: &'a [u8], config: NgramConfig) -> Self {
        Grams {
            decoder: Utf8Decoder::new(text),
            config,
            state: ScanState::Start,
            queued: None,
        }
    }

    /// Decode one codepoint, returning it with its byte range.
    fn decode(&mut self) -> std::result::Result<Option<(char, usize, usize)>, Utf8Error> {
        match self.decoder.next_step() {
            DecodeStep::Char(c) => Ok(Some((c, self.decoder.at_byte(), self.decoder.index()))),
            DecodeStep::End => Ok(None),
            DecodeStep::Error(err) => Err(err),
        }
    }

    fn first(&mut self) -> Option<std::result::Result<Gram, Utf8Error>> {
        let (c0, b0, b1) = match self.decode() {
            Ok(Some(step)) => step,
            Ok(None) => return self.finish(None),
            Err(err) => return self.finish(Some(Err(err))),
        };
        let seed = Gram {
            start: b0,
            end: b1,
            width: 1,
        };
        self.state = ScanState::Scanning {
            prev: c0,
            prev_start: b0,
        };
        if self.config.seed_first {
            return Some(Ok(seed));
        }

        // Unseeded: the first codepoint is emitted alone only when the
        // following pair does not cover it.
        match self.decode() {
            Ok(Some((c1, b1, b2))) => {
                self.state = ScanState::Scanning {
                    prev: c1,
                    prev_start: b1,
                };
                let pair = self.pair_gram(c0, b0, c1, b1, b2);
                if pair.width == 2 {
                    Some(Ok(pair))
                } else {
                    self.queued = Some(pair);
                    Some(Ok(seed))
                }
            }
            Ok(None) => {
                self.state = ScanState::Done;
                Some(Ok(seed))
            }
            Err(err) => self.finish(Some(Err(err))),
        }
    }

    fn pair_gram(&self, prev: char, prev_start: usize, cur: char, cur_start: usize, cur_end: usize) -> Gram {
        if self.config.is_narrow(prev) && self.config.is_narrow(cur) {
            Gram {
                start: prev_start,
                end: cur_end,
                width: 2,
            }
        } else {
            Gram {
                start: cur_start,
                end: cur_end,
                width: 1,
            }
        }
    }

    fn finish(
        &mut self,
        last: Option<std::result::Result<Gram, Utf8Error>>,
    ) -> Option<std::result::Result<Gram, Utf8Error>> {
        self.state = ScanState::Done;
        last
    }
}

impl Iterator for Grams<'_> {
    type Item = std::result::Result<Gram, Utf8Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(gram) = self.queued.take() {
            return Some(Ok(gram));
        }
        match self.state {
            ScanState::Done => None,
            ScanState::Start => self.first(),
            ScanState::Scanning { prev, prev_start } => match self.decode() {
                Ok(Some((cur, cur_start, cur_end))) => {
                    self.state = ScanState::Scanning {
                        prev: cur,
                        prev_start: cur_start,
                    };
                    Some(Ok(self.pair_gram(prev, prev_start, cur, cur_start, cur_end)))
                }
                Ok(None) => self.finish(None),
                Err(err) => self.finish(Some(Err(err))),
            },
        }
    }
}

impl std::iter::FusedIterator for Grams<'_> {}

/// Segment one token and forward each gram to `on_token`.
///
/// Flags are passed through unchanged. Stops at the first malformed
/// sequence (reported at its absolute offset) or the first callback error.
pub fn segment_token(config: &NgramConfig, token: Token<'_>, on_token: &mut TokenCallback<'_>) -> Result<()> {
    tracing::trace!(start = token.start, end = token.end, len = token.text.len(), "segmenting token");
    for gram in Grams::new(token.text, *config) {
        let gram = gram.map_err(|err| {
            let offset = token.start + err.offset;
            tracing::debug!(offset, kind = %err.kind, "malformed UTF-8 in token");
            NgramError::MalformedUtf8 {
                offset,
                kind: err.kind,
            }
        })?;
        on_token(Token {
            flags: token.flags,
            text: &token.text[gram.start..gram.end],
            start: token.start + gram.start,
            end: token.start + gram.end,
        })?;
    }
    Ok(())
}

/// Wraps a base tokenizer and re-segments each of its tokens into grams.
pub struct NgramTokenizer {
    base: Box<dyn Tokenizer>,
    config: NgramConfig,
}

impl NgramTokenizer {
    pub fn new(base: Box<dyn Tokenizer>, config: NgramConfig) -> Self {
        NgramTokenizer { base, config }
    }

    pub fn config(&self) -> &NgramConfig {
        &self.config
    }
}

impl Tokenizer for NgramTokenizer {
    fn tokenize(
        &self,
        flags: TokenizeFlags,
        text: &[u8],
        on_token: &mut TokenCallback<'_>,
    ) -> Result<()> {
        let config = self.config;
        self.base
            .tokenize(flags, text, &mut |token| segment_token(&config, token, &mut *on_token))
    }
}

/// Factory for `NgramTokenizer`.
///
/// Arguments: `[base-name [base-args...]]`; the base defaults to
/// `unicode61` and its arguments are forwarded verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgramFactory {
    config: NgramConfig,
}

impl NgramFactory {
    pub fn new(config: NgramConfig) -> Self {
        NgramFactory { config }
    }
}

impl TokenizerFactory for NgramFactory {
    fn create(&self, registry: &TokenizerRegistry, args: &[&str]) -> Result<Box<dyn Tokenizer>> {
        let (base_name, base_args) = match args.split_first() {
            Some((name, rest)) => (*name, rest),
            None => (DEFAULT_BASE_TOKENIZER, &[][..]),
        };
        let base = registry.create(base_name, base_args)?;
        tracing::debug!(
            base = base_name,
            wide_threshold = self.config.wide_threshold,
            seed_first = self.config.seed_first,
            "created ngram tokenizer"
        );
        Ok(Box::new(NgramTokenizer::new(base, self.config)))
    }
}
