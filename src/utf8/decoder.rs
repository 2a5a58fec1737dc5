/// Strict UTF-8 decoder.
///
/// Rejects, without recovery or U+FFFD substitution:
///
/// | lead byte  | continuations | accepted range                  |
/// |------------|---------------|---------------------------------|
/// | `0xxxxxxx` | 0             | 0 ..= 127                       |
/// | `10xxxxxx` | error         |                                 |
/// | `110xxxxx` | 1             | 128 ..= 2047                    |
/// | `1110xxxx` | 2             | 2048 ..= 65535 minus surrogates |
/// | `11110xxx` | 3             | 65536 ..= 1114111               |
/// | `11111xxx` | error         |                                 |
use thiserror::Error;

const SURROGATE_MIN: u32 = 0xD800;
const SURROGATE_MAX: u32 = 0xDFFF;
const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Why a byte sequence was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8ErrorKind {
    #[error("invalid leading byte 0x{0:02x}")]
    InvalidLeadByte(u8),

    #[error("invalid continuation byte 0x{0:02x}")]
    InvalidContinuation(u8),

    #[error("truncated multi-byte sequence")]
    Truncated,

    #[error("overlong encoding of U+{0:04X}")]
    Overlong(u32),

    #[error("encoded surrogate U+{0:04X}")]
    Surrogate(u32),

    #[error("codepoint 0x{0:X} out of range")]
    OutOfRange(u32),

    #[error("cursor past end of input")]
    CursorOverrun,
}

/// A rejected sequence and the byte offset (within the decoded buffer)
/// where it started.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("malformed UTF-8 at byte {offset}: {kind}")]
pub struct Utf8Error {
    pub offset: usize,
    pub kind: Utf8ErrorKind,
}

/// Result of a single decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    Char(char),
    End,
    Error(Utf8Error),
}

/// Cursor over one byte buffer.
#[derive(Debug, Clone)]
pub struct Utf8Decoder<'a> {
    input: &'a [u8],
    index: usize,
    char_count: usize,
    char_start: usize,
    failed: Option<Utf8Error>,
}

impl<'a> Utf8Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Utf8Decoder {
            input,
            index: 0,
            char_count: 0,
            char_start: 0,
            failed: None,
        }
    }

    /// Reinitialize over a new buffer, clearing any error state.
    pub fn reset(&mut self, input: &'a [u8]) {
        *self = Utf8Decoder::new(input);
    }

    /// Byte index of the cursor: how far scanning has progressed.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of decode steps that started a codepoint (including a
    /// failing one).
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// Byte index at which the most recently returned codepoint (or the
    /// failing sequence) started.
    pub fn at_byte(&self) -> usize {
        self.char_start
    }

    /// Zero-based index of the most recently returned codepoint.
    pub fn at_character(&self) -> usize {
        self.char_count.saturating_sub(1)
    }

    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }

    /// Decode the next codepoint.
    ///
    /// Once an error has been returned, every further call returns the same
    /// error until `reset` is called.
    pub fn next_step(&mut self) -> DecodeStep {
        if let Some(err) = self.failed {
            return DecodeStep::Error(err);
        }
        if self.index >= self.input.len() {
            if self.index == self.input.len() {
                return DecodeStep::End;
            }
            return self.fail(self.index, Utf8ErrorKind::CursorOverrun);
        }

        self.char_start = self.index;
        self.char_count += 1;
        let lead = self.input[self.index];
        self.index += 1;

        let (continuations, payload) = match lead {
            0x00..=0x7F => return DecodeStep::Char(char::from(lead)),
            0xC0..=0xDF => (1, u32::from(lead & 0x1F)),
            0xE0..=0xEF => (2, u32::from(lead & 0x0F)),
            0xF0..=0xF7 => (3, u32::from(lead & 0x07)),
            _ => return self.fail(self.char_start, Utf8ErrorKind::InvalidLeadByte(lead)),
        };

        let mut value = payload;
        for _ in 0..continuations {
            let Some(&byte) = self.input.get(self.index) else {
                return self.fail(self.char_start, Utf8ErrorKind::Truncated);
            };
            self.index += 1;
            if byte & 0xC0 != 0x80 {
                return self.fail(self.char_start, Utf8ErrorKind::InvalidContinuation(byte));
            }
            value = (value << 6) | u32::from(byte & 0x3F);
        }

        let min = match continuations {
            1 => 0x80,
            2 => 0x800,
            _ => 0x10000,
        };
        if value < min {
            return self.fail(self.char_start, Utf8ErrorKind::Overlong(value));
        }
        if (SURROGATE_MIN..=SURROGATE_MAX).contains(&value) {
            return self.fail(self.char_start, Utf8ErrorKind::Surrogate(value));
        }
        if value > MAX_CODEPOINT {
            return self.fail(self.char_start, Utf8ErrorKind::OutOfRange(value));
        }
        match char::from_u32(value) {
            Some(c) => DecodeStep::Char(c),
            None => self.fail(self.char_start, Utf8ErrorKind::OutOfRange(value)),
        }
    }

    fn fail(&mut self, offset: usize, kind: Utf8ErrorKind) -> DecodeStep {
        let err = Utf8Error { offset, kind };
        self.failed = Some(err);
        DecodeStep::Error(err)
    }
}

/// Yields `Ok(char)` until the end of input, or a single `Err` followed by
/// `None`.
impl Iterator for Utf8Decoder<'_> {
    type Item = Result<char, Utf8Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed.is_some() {
            return None;
        }
        match self.next_step() {
            DecodeStep::Char(c) => Some(Ok(c)),
            DecodeStep::End => None,
            DecodeStep::Error(err) => Some(Err(err)),
        }
    }
}

impl std::iter::FusedIterator for Utf8Decoder<'_> {}

/// Validate a whole buffer, returning the decoded codepoints.
pub fn decode_all(input: &[u8]) -> Result<Vec<char>, Utf8Error> {
    Utf8Decoder::new(input).collect()
}
