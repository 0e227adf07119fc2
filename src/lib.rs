//! FF3-1 format-preserving encryption for pseudonymizing structured text.
//!
//! This crate provides the FF3-1 block cipher (NIST SP 800-38G Rev.1) over
//! arbitrary alphabets, together with a preservation layer that lets free-form
//! text be encrypted while selected characters or regions keep their exact
//! positions.
//!
//! # Overview
//!
//! - **Alphabet**: an ordered, duplicate-free symbol set and the FF3-1 length
//!   bounds it implies
//! - **Ff3Cipher**: the 8-round Feistel engine with an AES round function,
//!   arbitrary radix via big integers
//! - **Adapter**: character and pattern preservation, alphabets derived from
//!   the input, cycle walking for short or unusual segments, and a reported
//!   sanitize fallback
//! - **Anonymizers**: ready-made policies for strings, digit strings, email
//!   addresses, national identifiers and names
//!
//! # Quick Start
//!
//! ## Card number under the digit alphabet
//!
//! ```rust
//! use ff3_anonymizer::{Alphabet, Ff3Cipher};
//!
//! let key = [0x2bu8; 16];
//! let tweak = [1u8, 2, 3, 4, 5, 6, 7];
//! let cipher = Ff3Cipher::new(&key, &tweak)?.with_alphabet(Alphabet::digits());
//!
//! let ciphertext = cipher.encrypt("4111111111111111")?;
//! assert_eq!(ciphertext.len(), 16);
//! assert!(ciphertext.chars().all(|c| c.is_ascii_digit()));
//! assert_eq!(cipher.decrypt(&ciphertext)?, "4111111111111111");
//! # Ok::<(), ff3_anonymizer::Error>(())
//! ```
//!
//! ## Free text with preserved separators
//!
//! ```rust
//! use ff3_anonymizer::{Adapter, Ff3Cipher};
//!
//! let cipher = Ff3Cipher::new(&[0x2bu8; 16], &[1, 2, 3, 4, 5, 6, 7])?;
//! let mut adapter = Adapter::new(cipher);
//! adapter.set_preserve_characters(['-', ' ']);
//!
//! let masked = adapter.anonymize("555-0198 ext 12")?;
//! assert_eq!(masked.find('-'), Some(3));
//! assert_eq!(masked.find(' '), Some(8));
//! assert_eq!(adapter.deanonymize(&masked)?, "555-0198 ext 12");
//! # Ok::<(), ff3_anonymizer::Error>(())
//! ```
//!
//! ## Only part of an identifier
//!
//! ```rust
//! use ff3_anonymizer::{Adapter, KeyTweakPair};
//!
//! let pair = KeyTweakPair::derive(b"application secret", "national-id", 32)?;
//! let mut adapter = Adapter::new(pair.cipher()?);
//! adapter.set_preserve_pattern(r"^\d{6}(\d{7})$")?;
//!
//! let masked = adapter.anonymize("1960512123456")?;
//! assert!(masked.starts_with("196051"));
//! assert_eq!(adapter.deanonymize(&masked)?, "1960512123456");
//! # Ok::<(), ff3_anonymizer::Error>(())
//! ```
//!
//! # Security Considerations
//!
//! - **Deterministic**: equal inputs under one (key, tweak) give equal outputs
//! - **No authentication**: ciphertexts carry no integrity tag
//! - **Small domains are weak**: low radix and short inputs give a small
//!   permutation domain
//! - **Fallbacks are lossy**: a degraded segment does not round-trip; use the
//!   `*_detailed` calls to detect it

pub mod adapter;
pub mod alphabet;
pub mod anonymizers;
pub mod common;
pub mod ff3;
pub mod keys;
pub mod splice;
mod walk;

#[cfg(test)]
mod cross_check;

pub use adapter::{Adapter, AdapterConfig, Transformed};
pub use alphabet::{Alphabet, CharClass, ClassSet, Recipe, max_length, min_length};
pub use anonymizers::{
    Anonymizer, EmailAnonymizer, NameAnonymizer, NumberStringAnonymizer,
    PersonalIdentifierAnonymizer, StringAnonymizer,
};
pub use common::{Direction, Error, Result};
pub use ff3::{Ff3Cipher, decrypt, encrypt};
pub use keys::KeyTweakPair;
