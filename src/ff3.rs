//! FF3-1 format-preserving block cipher (NIST SP 800-38G Rev.1).
//!
//! FF3-1 is an 8-round Feistel network over strings of numerals in an
//! arbitrary radix. AES keyed with the byte-reversed key serves as the round
//! function. Numeral values are handled as arbitrary-precision integers, so
//! any radix an [`Alphabet`] can express is supported.
//!
//! Security properties:
//! - Ciphertext has the same length and alphabet as the plaintext
//! - Deterministic: identical (key, tweak, alphabet, input) gives identical output
//! - No authentication - consider AEAD if integrity protection is needed
//! - Small domains (low radix, short input) give weak guarantees

use aes::cipher::{Array, BlockCipherEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use log::trace;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

use crate::alphabet::Alphabet;
use crate::common::{
    BLOCK_LENGTH, Direction, Error, MAX_CHUNKS, NUMERAL_BYTES, ROUNDS, Result, TWEAK_LENGTH,
    diversify_tweak,
};

/// AES keyed for FF3-1, selected by key length.
#[derive(Clone)]
enum Prf {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl Prf {
    fn new(key: &[u8]) -> Result<Self> {
        let reversed: Vec<u8> = key.iter().rev().copied().collect();
        let invalid = |_| Error::InvalidKeyLength(key.len());
        match key.len() {
            16 => Aes128::new_from_slice(&reversed).map(Prf::Aes128).map_err(invalid),
            24 => Aes192::new_from_slice(&reversed).map(Prf::Aes192).map_err(invalid),
            32 => Aes256::new_from_slice(&reversed).map(Prf::Aes256).map_err(invalid),
            len => Err(Error::InvalidKeyLength(len)),
        }
    }

    fn encrypt_block(&self, input: [u8; BLOCK_LENGTH]) -> [u8; BLOCK_LENGTH] {
        let mut block = Array::from(input);
        match self {
            Prf::Aes128(ks) => ks.encrypt_block(&mut block),
            Prf::Aes192(ks) => ks.encrypt_block(&mut block),
            Prf::Aes256(ks) => ks.encrypt_block(&mut block),
        }
        let mut out = [0u8; BLOCK_LENGTH];
        out.copy_from_slice(block.as_slice());
        out
    }
}

/// Interpret numerals as a base-`radix` integer, most significant first.
pub fn num_radix(numerals: &[u32], radix: u32) -> BigUint {
    let mut value = BigUint::zero();
    for &digit in numerals {
        value = value * radix + digit;
    }
    value
}

/// Encode `value` as exactly `len` base-`radix` numerals, most significant first.
///
/// The value must be below `radix^len`; higher digits are dropped.
pub fn str_radix(value: &BigUint, radix: u32, len: usize) -> Vec<u32> {
    let radix_big = BigUint::from(radix);
    let mut remaining = value.clone();
    let mut out = vec![0u32; len];
    for slot in out.iter_mut().rev() {
        let (quotient, digit) = remaining.div_rem(&radix_big);
        *slot = digit.iter_u32_digits().next().unwrap_or(0);
        remaining = quotient;
    }
    out
}

/// `NUM_radix(REV(X))`: numerals read least significant first.
fn num_rev(numerals: &[u32], radix: u32) -> BigUint {
    let mut value = BigUint::zero();
    for &digit in numerals.iter().rev() {
        value = value * radix + digit;
    }
    value
}

/// `REV(STR^m_radix(value))`: numerals written least significant first.
fn str_rev(value: &BigUint, radix: u32, len: usize) -> Vec<u32> {
    let mut out = str_radix(value, radix, len);
    out.reverse();
    out
}

/// Split a 56-bit tweak into the FF3-1 halves `T_L` and `T_R`.
pub fn split_tweak(tweak: &[u8; TWEAK_LENGTH]) -> ([u8; 4], [u8; 4]) {
    let left = [tweak[0], tweak[1], tweak[2], tweak[3] & 0xf0];
    let right = [tweak[4], tweak[5], tweak[6], (tweak[3] & 0x0f) << 4];
    (left, right)
}

fn tweak_array(tweak: &[u8]) -> Result<[u8; TWEAK_LENGTH]> {
    tweak
        .try_into()
        .map_err(|_| Error::InvalidTweakLength(tweak.len()))
}

/// FF3-1 cipher bound to a key, a tweak and an alphabet.
#[derive(Clone)]
pub struct Ff3Cipher {
    prf: Prf,
    tweak: [u8; TWEAK_LENGTH],
    alphabet: Alphabet,
}

impl Ff3Cipher {
    /// Tweak length in bytes (always 7).
    pub const TWEAK_LENGTH: usize = TWEAK_LENGTH;

    /// Number of Feistel rounds (always 8).
    pub const ROUNDS: usize = ROUNDS;

    /// Create a cipher over the default alphanumeric alphabet.
    ///
    /// # Errors
    /// `Error::InvalidKeyLength` unless the key is 16, 24 or 32 bytes;
    /// `Error::InvalidTweakLength` unless the tweak is 7 bytes.
    pub fn new(key: &[u8], tweak: &[u8]) -> Result<Self> {
        Self::with_alphabet_parts(key, tweak, Alphabet::default())
    }

    fn with_alphabet_parts(key: &[u8], tweak: &[u8], alphabet: Alphabet) -> Result<Self> {
        let tweak = tweak_array(tweak)?;
        let prf = Prf::new(key)?;
        Ok(Self {
            prf,
            tweak,
            alphabet,
        })
    }

    /// Same key and tweak, different alphabet.
    pub fn with_alphabet(&self, alphabet: Alphabet) -> Self {
        Self {
            prf: self.prf.clone(),
            tweak: self.tweak,
            alphabet,
        }
    }

    /// Same key and tweak over the alphabet formed by `symbols`.
    ///
    /// # Errors
    /// `Error::InvalidAlphabet` with fewer than two distinct symbols.
    pub fn with_custom_alphabet(&self, symbols: &str) -> Result<Self> {
        Ok(self.with_alphabet(Alphabet::new(symbols)?))
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn tweak(&self) -> &[u8; TWEAK_LENGTH] {
        &self.tweak
    }

    /// Encrypt a string over the cipher's alphabet.
    ///
    /// # Errors
    /// `Error::DomainLength` if the length is outside the alphabet's bounds,
    /// `Error::InvalidSymbol` if a character is not in the alphabet.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.crypt_str(plaintext, Direction::Encrypt)
    }

    /// Decrypt a string over the cipher's alphabet.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        self.crypt_str(ciphertext, Direction::Decrypt)
    }

    fn crypt_str(&self, input: &str, direction: Direction) -> Result<String> {
        let chars: Vec<char> = input.chars().collect();
        let out = self.crypt_chars(&chars, &self.tweak, direction)?;
        Ok(out.into_iter().collect())
    }

    /// Run FF3-1 over characters with an explicit tweak.
    pub(crate) fn crypt_chars(
        &self,
        chars: &[char],
        tweak: &[u8; TWEAK_LENGTH],
        direction: Direction,
    ) -> Result<Vec<char>> {
        self.check_length(chars.len())?;
        let numerals = self.alphabet.to_numerals(chars)?;
        let out = self.feistel(&numerals, tweak, direction);
        self.alphabet.to_symbols(&out)
    }

    /// Encrypt numerals in `[0, radix)` directly.
    pub fn encrypt_numerals(&self, numerals: &[u32]) -> Result<Vec<u32>> {
        self.crypt_numerals(numerals, Direction::Encrypt)
    }

    /// Decrypt numerals in `[0, radix)` directly.
    pub fn decrypt_numerals(&self, numerals: &[u32]) -> Result<Vec<u32>> {
        self.crypt_numerals(numerals, Direction::Decrypt)
    }

    fn crypt_numerals(&self, numerals: &[u32], direction: Direction) -> Result<Vec<u32>> {
        self.check_length(numerals.len())?;
        let radix = self.alphabet.radix();
        if let Some(&index) = numerals.iter().find(|&&d| d >= radix) {
            return Err(Error::OutOfRange { index, radix });
        }
        Ok(self.feistel(numerals, &self.tweak, direction))
    }

    /// Transform text of any length by splitting it into balanced chunks
    /// that each fit the domain, diversifying the tweak per chunk.
    pub(crate) fn crypt_chunked(&self, chars: &[char], direction: Direction) -> Result<Vec<char>> {
        let max = self.alphabet.max_length();
        if chars.len() <= max {
            return self.crypt_chars(chars, &self.tweak, direction);
        }

        let chunks = chars.len().div_ceil(max);
        let last = u16::try_from(chunks - 1).map_err(|_| Error::TooManyChunks {
            chunks,
            max: MAX_CHUNKS,
        })?;
        let base = chars.len() / chunks;
        let extra = chars.len() % chunks;
        trace!("chunking {} symbols into {} pieces", chars.len(), chunks);

        let mut out = Vec::with_capacity(chars.len());
        let mut start = 0;
        for index in 0..=last {
            let len = base + usize::from(usize::from(index) < extra);
            let tweak = diversify_tweak(&self.tweak, index);
            out.extend(self.crypt_chars(&chars[start..start + len], &tweak, direction)?);
            start += len;
        }
        Ok(out)
    }

    fn check_length(&self, len: usize) -> Result<()> {
        let (min, max) = (self.alphabet.min_length(), self.alphabet.max_length());
        if len < min || len > max {
            return Err(Error::DomainLength { len, min, max });
        }
        Ok(())
    }

    /// Round function output `y` for round `round` applied to half `x`.
    fn round_value(&self, w: &[u8; 4], round: usize, x: &[u32], radix: u32) -> BigUint {
        let mut p = [0u8; BLOCK_LENGTH];
        p[..4].copy_from_slice(w);
        p[3] ^= round as u8;

        let numeral = num_rev(x, radix).to_bytes_be();
        debug_assert!(numeral.len() <= NUMERAL_BYTES);
        p[BLOCK_LENGTH - numeral.len()..].copy_from_slice(&numeral);

        p.reverse();
        let s = self.prf.encrypt_block(p);
        // REVB of the output read big-endian is the raw output read little-endian.
        BigUint::from_bytes_le(&s)
    }

    fn feistel(&self, x: &[u32], tweak: &[u8; TWEAK_LENGTH], direction: Direction) -> Vec<u32> {
        let radix = self.alphabet.radix();
        let n = x.len();
        let u = n.div_ceil(2);
        let v = n - u;
        trace!("ff3-1 {:?}: radix {}, length {}", direction, radix, n);

        let (t_left, t_right) = split_tweak(tweak);
        let radix_big = BigUint::from(radix);
        let modulus_u = num_traits::pow(radix_big.clone(), u);
        let modulus_v = if v == u {
            modulus_u.clone()
        } else {
            num_traits::pow(radix_big, v)
        };
        let params = |round: usize| {
            if round % 2 == 0 {
                (u, &modulus_u, &t_right)
            } else {
                (v, &modulus_v, &t_left)
            }
        };

        let mut a = x[..u].to_vec();
        let mut b = x[u..].to_vec();

        match direction {
            Direction::Encrypt => {
                for round in 0..ROUNDS {
                    let (m, modulus, w) = params(round);
                    let y = self.round_value(w, round, &b, radix);
                    let c = (num_rev(&a, radix) + y) % modulus;
                    a = std::mem::replace(&mut b, str_rev(&c, radix, m));
                }
            }
            Direction::Decrypt => {
                for round in (0..ROUNDS).rev() {
                    let (m, modulus, w) = params(round);
                    let y = self.round_value(w, round, &a, radix) % modulus;
                    let c = (num_rev(&b, radix) + modulus - y) % modulus;
                    b = std::mem::replace(&mut a, str_rev(&c, radix, m));
                }
            }
        }

        a.extend_from_slice(&b);
        a
    }
}

/// Encrypt `plaintext` over `alphabet` with a one-off key schedule.
pub fn encrypt(alphabet: &Alphabet, key: &[u8], tweak: &[u8], plaintext: &str) -> Result<String> {
    Ff3Cipher::with_alphabet_parts(key, tweak, alphabet.clone())?.encrypt(plaintext)
}

/// Decrypt `ciphertext` over `alphabet` with a one-off key schedule.
pub fn decrypt(alphabet: &Alphabet, key: &[u8], tweak: &[u8], ciphertext: &str) -> Result<String> {
    Ff3Cipher::with_alphabet_parts(key, tweak, alphabet.clone())?.decrypt(ciphertext)
}
