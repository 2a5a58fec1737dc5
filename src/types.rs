/// Flag bit-sets passed through the tokenizer chain.
///
/// Neither set is interpreted by the n-gram layer; both are forwarded
/// unchanged from the caller to the base tokenizer and from the base
/// tokenizer to the downstream callback.
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Describes why a text is being tokenized.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenizeFlags(u32);

impl TokenizeFlags {
    pub const NONE: TokenizeFlags = TokenizeFlags(0);
    /// Tokenizing a query string.
    pub const QUERY: TokenizeFlags = TokenizeFlags(0x0001);
    /// Query term is a prefix query.
    pub const PREFIX: TokenizeFlags = TokenizeFlags(0x0002);
    /// Tokenizing a document being inserted or removed.
    pub const DOCUMENT: TokenizeFlags = TokenizeFlags(0x0004);
    /// Tokenizing for an auxiliary function (snippet, highlight).
    pub const AUX: TokenizeFlags = TokenizeFlags(0x0008);

    pub const fn from_bits(bits: u32) -> Self {
        TokenizeFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: TokenizeFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Per-token flags reported with each emitted token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenFlags(u32);

impl TokenFlags {
    pub const NONE: TokenFlags = TokenFlags(0);
    /// Token occupies the same position as the previous token (synonym).
    pub const COLOCATED: TokenFlags = TokenFlags(0x0001);

    pub const fn from_bits(bits: u32) -> Self {
        TokenFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: TokenFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

macro_rules! impl_bit_ops {
    ($ty:ident) => {
        impl BitOr for $ty {
            type Output = $ty;
            fn bitor(self, rhs: $ty) -> $ty {
                $ty(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $ty {
            fn bitor_assign(&mut self, rhs: $ty) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $ty {
            type Output = $ty;
            fn bitand(self, rhs: $ty) -> $ty {
                $ty(self.0 & rhs.0)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#06x})", stringify!($ty), self.0)
            }
        }
    };
}

impl_bit_ops!(TokenizeFlags);
impl_bit_ops!(TokenFlags);
