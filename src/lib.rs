//! fts-ngram: N-gram tokenizer for full-text search indexing.
//!
//! Wraps a base tokenizer (word splitting, case folding, diacritic
//! removal) and re-segments every token it produces:
//! - runs of narrow codepoints (below U+2000: Latin, Greek, Cyrillic, ...)
//!   become overlapping bigrams
//! - wide codepoints (CJK and other dense scripts) become unigrams
//! - the first codepoint of each token is always indexed on its own
//!
//! Tokens are validated by a strict UTF-8 decoder; gram offsets are
//! reported in the coordinate space of the original input.

pub mod error;
pub mod types;
pub mod utf8;
pub mod fts;

pub use crate::error::{NgramError, Result};
pub use crate::fts::ngram::{segment_token, Gram, Grams, NgramConfig, NgramFactory, NgramTokenizer};
pub use crate::fts::registry::TokenizerRegistry;
pub use crate::fts::tokenizer::{collect_tokens, OwnedToken, Token, TokenCallback, Tokenizer, TokenizerFactory};
pub use crate::types::{TokenFlags, TokenizeFlags};
pub use crate::utf8::decoder::{DecodeStep, Utf8Decoder, Utf8Error, Utf8ErrorKind};
