//! Cycle walking over restricted domains.
//!
//! A permutation of `A^n` restricted to a subset `S` stays a permutation of
//! `S` if every image outside `S` is fed back through the cipher until it
//! lands inside again. Decryption walks the same cycle backwards and stops
//! at the first member of `S`, which is the original plaintext.
//!
//! Two restrictions are applied here:
//! - padding: inputs shorter than the alphabet minimum are padded with a
//!   filler symbol and the padding region must come back as filler, so
//!   trimming it off is invertible;
//! - alphabet closure: under a derived alphabet the image must derive the
//!   same alphabet, so the decrypt side can rebuild it from the ciphertext.

use log::debug;

use crate::alphabet::{Alphabet, Recipe};
use crate::common::{Direction, Error, Result};
use crate::ff3::Ff3Cipher;

/// Symbol used to pad `alphabet`, preferring `preferred` when it is a member.
pub(crate) fn filler_for(alphabet: &Alphabet, preferred: char) -> char {
    if alphabet.contains(preferred) {
        preferred
    } else {
        alphabet.symbols()[0]
    }
}

/// Apply `cipher` to `text`, walking until the padded tail returns to
/// `filler` and `accept` holds for the visible part.
///
/// `text` itself must satisfy `accept`.
pub(crate) fn cycle_walk<F>(
    cipher: &Ff3Cipher,
    text: &[char],
    filler: char,
    max_walks: usize,
    direction: Direction,
    accept: F,
) -> Result<Vec<char>>
where
    F: Fn(&[char]) -> bool,
{
    let n = text.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut state = text.to_vec();
    state.resize(n.max(cipher.alphabet().min_length()), filler);

    for walk in 1..=max_walks {
        state = cipher.crypt_chunked(&state, direction)?;
        if state[n..].iter().all(|&c| c == filler) && accept(&state[..n]) {
            if walk > 1 {
                debug!("cycle walk settled after {} steps", walk);
            }
            state.truncate(n);
            return Ok(state);
        }
    }

    Err(Error::CycleWalkExhausted { walks: max_walks })
}

/// Estimated probability that one walk step lands in the restricted domain.
///
/// Each group must be hit by at least one of `visible` uniformly random
/// symbols and every padding position must come back as the filler. Both
/// directions compute the same estimate from the same alphabet and length.
pub(crate) fn acceptance_rate(radix: u32, groups: &[usize], visible: usize, padding: usize) -> f64 {
    if groups.len() > visible {
        return 0.0;
    }
    let r = f64::from(radix);
    let visible = i32::try_from(visible).unwrap_or(i32::MAX);
    let padding = i32::try_from(padding).unwrap_or(i32::MAX);
    let hit: f64 = groups
        .iter()
        .map(|&g| 1.0 - (1.0 - g as f64 / r).powi(visible))
        .product();
    hit * r.powi(-padding)
}

/// Transform `text` under the alphabet `recipe` derives from it.
///
/// The result derives the same alphabet and satisfies `extra`, so the
/// inverse transform can be run on it without any side information.
/// Segments whose estimated walk length exceeds `max_walks` are rejected
/// up front with `Error::CycleWalkExhausted { walks: 0 }`.
pub(crate) fn derived_transform<F>(
    cipher: &Ff3Cipher,
    text: &[char],
    recipe: &Recipe,
    preferred_filler: char,
    max_walks: usize,
    direction: Direction,
    extra: F,
) -> Result<Vec<char>>
where
    F: Fn(&[char]) -> bool,
{
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let alphabet = Alphabet::derive(text, recipe)?;
    let padding = alphabet.min_length().saturating_sub(text.len());
    let rate = acceptance_rate(
        alphabet.radix(),
        &recipe.required_groups(&alphabet),
        text.len(),
        padding,
    );
    if rate * (max_walks as f64) < 1.0 {
        debug!(
            "acceptance rate {:.3e} too low for {} walks, radix {}",
            rate,
            max_walks,
            alphabet.radix()
        );
        return Err(Error::CycleWalkExhausted { walks: 0 });
    }

    let filler = filler_for(&alphabet, preferred_filler);
    let cipher = cipher.with_alphabet(alphabet.clone());

    cycle_walk(&cipher, text, filler, max_walks, direction, |candidate| {
        Alphabet::derive(candidate, recipe).is_ok_and(|derived| derived == alphabet)
            && extra(candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::ClassSet;

    fn cipher() -> Ff3Cipher {
        Ff3Cipher::new(&[7u8; 16], &[1, 2, 3, 4, 5, 6, 7]).unwrap()
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_short_input_walk_is_invertible() {
        let cipher = cipher().with_alphabet(Alphabet::digits());
        for s in ["7", "42", "00", "9"] {
            let text = chars(s);
            let ct = cycle_walk(&cipher, &text, '0', 100_000, Direction::Encrypt, |_| true).unwrap();
            assert_eq!(ct.len(), text.len());
            let pt = cycle_walk(&cipher, &ct, '0', 100_000, Direction::Decrypt, |_| true).unwrap();
            assert_eq!(pt, text);
        }
    }

    #[test]
    fn test_derived_alphabet_roundtrip_with_extras() {
        let recipe = Recipe::baseline(ClassSet::ALPHANUMERIC);
        let text = chars("Romănă");
        let ct = derived_transform(&cipher(), &text, &recipe, 'A', 100_000, Direction::Encrypt, |_| true)
            .unwrap();
        assert_eq!(ct.len(), text.len());
        assert!(ct.contains(&'ă'));
        let pt = derived_transform(&cipher(), &ct, &recipe, 'A', 100_000, Direction::Decrypt, |_| true)
            .unwrap();
        assert_eq!(pt, text);
    }

    #[test]
    fn test_walk_exhaustion_reported() {
        let recipe = Recipe::baseline(ClassSet::ALPHANUMERIC);
        let text = chars("€£¥§©®™");
        let err = derived_transform(&cipher(), &text, &recipe, 'A', 100_000, Direction::Encrypt, |_| true)
            .unwrap_err();
        assert_eq!(err, Error::CycleWalkExhausted { walks: 0 });
    }

    #[test]
    fn test_cycle_walk_exhaustion_counts_walks() {
        let cipher = cipher().with_alphabet(Alphabet::digits());
        let text = chars("12345");
        let err = cycle_walk(&cipher, &text, '0', 3, Direction::Encrypt, |_| false).unwrap_err();
        assert_eq!(err, Error::CycleWalkExhausted { walks: 3 });
    }

    #[test]
    fn test_acceptance_rate() {
        assert_eq!(acceptance_rate(62, &[], 5, 0), 1.0);
        assert_eq!(acceptance_rate(62, &[1, 1, 1], 2, 0), 0.0);
        let padded = acceptance_rate(10, &[], 1, 2);
        assert!((padded - 0.01).abs() < 1e-12);
        let one_extra = acceptance_rate(63, &[1], 6, 0);
        assert!(one_extra > 0.05 && one_extra < 0.15);
    }

    #[test]
    fn test_filler_for_falls_back_to_first_symbol() {
        assert_eq!(filler_for(&Alphabet::alphanumeric(), 'A'), 'A');
        assert_eq!(filler_for(&Alphabet::digits(), 'A'), '0');
    }

    #[test]
    fn test_empty_text_passes_through() {
        let recipe = Recipe::closure();
        let out = derived_transform(&cipher(), &[], &recipe, 'A', 1, Direction::Encrypt, |_| true).unwrap();
        assert!(out.is_empty());
    }
}
