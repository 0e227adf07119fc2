//! Common definitions shared by the alphabet, engine and adapter layers.

use thiserror::Error;

/// Unified error type for all FF3-1 and preservation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input length falls outside the valid FF3-1 domain for the radix.
    #[error("input length {len} outside domain bounds [{min}, {max}]")]
    DomainLength { len: usize, min: usize, max: usize },
    /// A character is not a member of the alphabet in use.
    #[error("symbol {0:?} is not in the alphabet")]
    InvalidSymbol(char),
    /// A numeral index does not map to any symbol.
    #[error("index {index} out of range for radix {radix}")]
    OutOfRange { index: u32, radix: u32 },
    /// Tweak is not exactly 56 bits.
    #[error("tweak must be 7 bytes, got {0}")]
    InvalidTweakLength(usize),
    /// Key is not a valid AES key size.
    #[error("key must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    /// Alphabet has fewer than two distinct symbols.
    #[error("alphabet needs at least 2 distinct symbols, got {0}")]
    InvalidAlphabet(usize),
    /// Preservation pattern failed to compile.
    #[error("invalid preservation pattern: {0}")]
    InvalidPattern(String),
    /// Key or tweak text is not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Input needs more chunks than distinct chunk tweaks exist.
    #[error("input needs {chunks} chunks, at most {max} are supported")]
    TooManyChunks { chunks: usize, max: usize },
    /// No image inside the restricted domain was reached in time.
    #[error("cycle walk exhausted after {walks} iterations")]
    CycleWalkExhausted { walks: usize },
}

impl Error {
    /// Whether the error reflects text the derived alphabet could not carry,
    /// as opposed to a misconfigured key, tweak or pattern.
    pub fn is_representability(&self) -> bool {
        matches!(
            self,
            Error::DomainLength { .. }
                | Error::InvalidSymbol(_)
                | Error::InvalidAlphabet(_)
                | Error::CycleWalkExhausted { .. }
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// AES block length in bytes.
pub const BLOCK_LENGTH: usize = 16;

/// FF3-1 tweak length in bytes (56 bits).
pub const TWEAK_LENGTH: usize = 7;

/// Number of Feistel rounds.
pub const ROUNDS: usize = 8;

/// Smallest half-domain size accepted: `radix^ceil(n/2) >= DOMAIN_MIN`.
pub const DOMAIN_MIN: u128 = 100;

/// Each half's numeral value must fit in this many bits.
pub const HALF_BITS: u32 = 96;

/// Bytes used to encode a half's numeral value in the round input.
pub const NUMERAL_BYTES: usize = 12;

/// Chunks of one long input, one per distinct 16-bit tweak counter.
pub const MAX_CHUNKS: usize = 1 << 16;

/// Padding symbol for segments shorter than the minimum length.
pub const DEFAULT_FILLER: char = 'A';

/// Replacement for unsafe characters on the fallback path.
pub const DEFAULT_SENTINEL: char = 'X';

pub const DIGITS: &str = "0123456789";
pub const UPPER_ALPHA: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWER_ALPHA: &str = "abcdefghijklmnopqrstuvwxyz";

/// Common punctuation kept representable around captured groups.
pub const PUNCTUATION: &str = " .,-_@'/:;!?()&#+\"";

/// Symbols allowed in the local part of an email address.
pub const EMAIL_SYMBOLS: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-_+";

/// Direction of cipher operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// XOR a chunk index into the trailing bytes of a tweak.
///
/// Index 0 leaves the tweak untouched.
#[inline]
pub fn diversify_tweak(tweak: &[u8; TWEAK_LENGTH], index: u16) -> [u8; TWEAK_LENGTH] {
    let mut result = *tweak;
    let counter = index.to_be_bytes();
    result[TWEAK_LENGTH - 2] ^= counter[0];
    result[TWEAK_LENGTH - 1] ^= counter[1];
    result
}
