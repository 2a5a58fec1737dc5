use thiserror::Error;

use crate::utf8::decoder::Utf8ErrorKind;

#[derive(Error, Debug)]
pub enum NgramError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed UTF-8 at byte {offset}: {kind}")]
    MalformedUtf8 { offset: usize, kind: Utf8ErrorKind },

    #[error("Tokenizer not found: {0}")]
    TokenizerNotFound(String),

    #[error("Invalid tokenizer argument: {0}")]
    InvalidArgument(String),

    #[error("Token callback failed: {0}")]
    Callback(String),
}

pub type Result<T> = std::result::Result<T, NgramError>;
