//! Ordered symbol sets and the FF3-1 domain bounds they imply.
//!
//! An [`Alphabet`] is a bijection between its symbols and the integers
//! `0..radix`. Alphabets are plain values: they are built for a single call
//! and dropped afterwards.
//!
//! Derived alphabets are produced by [`Alphabet::derive`] from a piece of text
//! and a [`Recipe`]. The resulting symbol order depends only on the symbol
//! set, never on the order characters appear in the text, so plaintext and
//! ciphertext that contain the same classes and extras derive the very same
//! alphabet.

use std::collections::{BTreeSet, HashMap};

use crate::common::{
    DIGITS, DOMAIN_MIN, EMAIL_SYMBOLS, Error, HALF_BITS, LOWER_ALPHA, PUNCTUATION, Result,
    UPPER_ALPHA,
};

/// Character classes used as building blocks for derived alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharClass {
    /// ASCII digits `0-9`.
    Digits,
    /// ASCII letters `A-Z` followed by `a-z`.
    Letters,
    /// The fixed punctuation set in [`PUNCTUATION`].
    Punctuation,
}

impl CharClass {
    /// All classes in canonical alphabet order.
    pub const ALL: [CharClass; 3] = [CharClass::Digits, CharClass::Letters, CharClass::Punctuation];

    /// Class a character belongs to, if any.
    pub fn of(c: char) -> Option<CharClass> {
        if c.is_ascii_digit() {
            Some(CharClass::Digits)
        } else if c.is_ascii_alphabetic() {
            Some(CharClass::Letters)
        } else if PUNCTUATION.contains(c) {
            Some(CharClass::Punctuation)
        } else {
            None
        }
    }

    fn symbols(self) -> impl Iterator<Item = char> {
        let parts: [&'static str; 2] = match self {
            CharClass::Digits => [DIGITS, ""],
            CharClass::Letters => [UPPER_ALPHA, LOWER_ALPHA],
            CharClass::Punctuation => [PUNCTUATION, ""],
        };
        parts.into_iter().flat_map(str::chars)
    }

    const fn bit(self) -> u8 {
        match self {
            CharClass::Digits => 1,
            CharClass::Letters => 2,
            CharClass::Punctuation => 4,
        }
    }
}

/// A set of [`CharClass`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassSet(u8);

impl ClassSet {
    pub const EMPTY: ClassSet = ClassSet(0);
    pub const DIGITS: ClassSet = ClassSet(CharClass::Digits.bit());
    pub const LETTERS: ClassSet = ClassSet(CharClass::Letters.bit());
    pub const PUNCTUATION: ClassSet = ClassSet(CharClass::Punctuation.bit());
    pub const ALPHANUMERIC: ClassSet = ClassSet(CharClass::Digits.bit() | CharClass::Letters.bit());

    pub const fn contains(self, class: CharClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn insert(&mut self, class: CharClass) {
        self.0 |= class.bit();
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Policy for deriving an alphabet from text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    baseline: ClassSet,
    closure: bool,
    exclude: BTreeSet<char>,
}

impl Recipe {
    /// Fixed baseline classes plus every other character of the text.
    pub fn baseline(classes: ClassSet) -> Self {
        Self {
            baseline: classes,
            closure: false,
            exclude: BTreeSet::new(),
        }
    }

    /// Every class the text touches, plus its unclassified characters.
    pub fn closure() -> Self {
        Self {
            baseline: ClassSet::EMPTY,
            closure: true,
            exclude: BTreeSet::new(),
        }
    }

    /// Drop these symbols from the derived alphabet unless the text itself
    /// contains them.
    pub fn excluding<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.exclude.extend(chars);
        self
    }

    /// Sizes of the symbol groups a text must each touch at least once to
    /// derive `alphabet` under this recipe.
    pub fn required_groups(&self, alphabet: &Alphabet) -> Vec<usize> {
        let mut groups = Vec::new();
        let mut grouped = BTreeSet::new();

        if self.closure {
            for class in CharClass::ALL {
                if self.baseline.contains(class) {
                    continue;
                }
                let members: Vec<char> = class
                    .symbols()
                    .filter(|c| alphabet.contains(*c) && !self.exclude.contains(c))
                    .collect();
                if !members.is_empty() {
                    groups.push(members.len());
                    grouped.extend(members);
                }
            }
        }

        for &c in alphabet.symbols() {
            let fixed = !self.exclude.contains(&c)
                && CharClass::of(c).is_some_and(|class| self.baseline.contains(class));
            if !fixed && !grouped.contains(&c) {
                groups.push(1);
            }
        }
        groups
    }
}

/// An ordered, duplicate-free symbol set.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<char>,
    index: HashMap<char, u32>,
    min_length: usize,
    max_length: usize,
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl Alphabet {
    /// Build an alphabet from candidate symbols, dropping repeats.
    ///
    /// # Errors
    /// Returns `Error::InvalidAlphabet` with fewer than two distinct symbols.
    pub fn new(symbols: &str) -> Result<Self> {
        Self::from_symbols(symbols.chars())
    }

    /// Build an alphabet from an iterator of candidate symbols, dropping repeats.
    pub fn from_symbols<I: IntoIterator<Item = char>>(symbols: I) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let unique: Vec<char> = symbols.into_iter().filter(|c| seen.insert(*c)).collect();
        if unique.len() < 2 {
            return Err(Error::InvalidAlphabet(unique.len()));
        }
        Ok(Self::from_unique(unique))
    }

    fn from_unique(symbols: Vec<char>) -> Self {
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as u32))
            .collect();
        let radix = symbols.len() as u32;
        Self {
            symbols,
            index,
            min_length: min_length(radix),
            max_length: max_length(radix),
        }
    }

    /// Decimal digits, radix 10.
    pub fn digits() -> Self {
        Self::from_unique(DIGITS.chars().collect())
    }

    /// Lowercase ASCII letters, radix 26.
    pub fn lower_alpha() -> Self {
        Self::from_unique(LOWER_ALPHA.chars().collect())
    }

    /// Digits followed by upper and lower ASCII letters, radix 62.
    pub fn alphanumeric() -> Self {
        Self::from_unique(CharClass::Digits.symbols().chain(CharClass::Letters.symbols()).collect())
    }

    /// Symbols valid in an email local part.
    pub fn email() -> Self {
        Self::from_unique(EMAIL_SYMBOLS.chars().collect())
    }

    /// Derive the alphabet for `text` under `recipe`.
    ///
    /// Baseline and touched classes come first in canonical order, followed
    /// by the remaining characters sorted by code point.
    pub fn derive(text: &[char], recipe: &Recipe) -> Result<Self> {
        let mut classes = recipe.baseline;
        let mut extras = BTreeSet::new();
        let present: BTreeSet<char> = text.iter().copied().collect();

        for &c in &present {
            match CharClass::of(c) {
                Some(class) if classes.contains(class) => {}
                Some(class) if recipe.closure => classes.insert(class),
                _ => {
                    extras.insert(c);
                }
            }
        }

        let keep = |c: &char| !recipe.exclude.contains(c) || present.contains(c);
        let mut seen = BTreeSet::new();
        let symbols: Vec<char> = CharClass::ALL
            .into_iter()
            .filter(|class| classes.contains(*class))
            .flat_map(CharClass::symbols)
            .chain(extras)
            .filter(keep)
            .filter(|c| seen.insert(*c))
            .collect();

        if symbols.len() < 2 {
            return Err(Error::InvalidAlphabet(symbols.len()));
        }
        Ok(Self::from_unique(symbols))
    }

    /// Number of symbols.
    pub fn radix(&self) -> u32 {
        self.symbols.len() as u32
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    /// Numeral value of a symbol.
    pub fn index_of(&self, c: char) -> Result<u32> {
        self.index.get(&c).copied().ok_or(Error::InvalidSymbol(c))
    }

    /// Symbol for a numeral value.
    pub fn symbol_at(&self, index: u32) -> Result<char> {
        self.symbols
            .get(index as usize)
            .copied()
            .ok_or(Error::OutOfRange {
                index,
                radix: self.radix(),
            })
    }

    /// Shortest valid FF3-1 input for this radix.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Longest valid FF3-1 input for this radix.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Map symbols to numerals.
    pub fn to_numerals(&self, chars: &[char]) -> Result<Vec<u32>> {
        chars.iter().map(|&c| self.index_of(c)).collect()
    }

    /// Map numerals back to symbols.
    pub fn to_symbols(&self, numerals: &[u32]) -> Result<Vec<char>> {
        numerals.iter().map(|&i| self.symbol_at(i)).collect()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::alphanumeric()
    }
}

/// Smallest `n >= 2` with `radix^ceil(n/2) >= DOMAIN_MIN`.
pub fn min_length(radix: u32) -> usize {
    debug_assert!(radix >= 2);
    let r = radix as u128;
    let mut half = 1usize;
    let mut capacity = r;
    while capacity < DOMAIN_MIN {
        capacity = capacity.saturating_mul(r);
        half += 1;
    }
    (2 * half - 1).max(2)
}

/// Twice the largest `u` with `radix^u <= 2^96`.
///
/// This is the FF3-1 `maxlen = 2·⌊log_radix(2^96)⌋` of NIST SP 800-38G
/// Rev.1, so 56 for radix 10 and 12 for radix `2^16`.
pub fn max_length(radix: u32) -> usize {
    debug_assert!(radix >= 2);
    let r = radix as u128;
    let limit = 1u128 << HALF_BITS;
    let mut half = 0usize;
    let mut capacity: u128 = 1;
    loop {
        match capacity.checked_mul(r) {
            Some(next) if next <= limit => {
                capacity = next;
                half += 1;
            }
            _ => break,
        }
    }
    2 * half
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_decimal() {
        assert_eq!(min_length(10), 3);
        assert_eq!(max_length(10), 56);
    }

    #[test]
    fn test_bounds_binary_and_large() {
        assert_eq!(min_length(2), 13);
        assert_eq!(max_length(2), 192);
        assert_eq!(min_length(100), 2);
        assert_eq!(min_length(62), 3);
        assert_eq!(max_length(62), 32);
        assert_eq!(max_length(1 << 16), 12);
        assert_eq!(max_length(1 << 20), 8);
    }

    #[test]
    fn test_max_length_power_of_two_radices() {
        for bits in 1..32u32 {
            let expected = 2 * (96 / bits) as usize;
            assert_eq!(max_length(1 << bits), expected, "radix 2^{}", bits);
        }
    }

    #[test]
    fn test_new_dedups_and_rejects_short() {
        let a = Alphabet::new("aabbc").unwrap();
        assert_eq!(a.symbols(), &['a', 'b', 'c']);
        assert_eq!(Alphabet::new("zzzz"), Err(Error::InvalidAlphabet(1)));
        assert_eq!(Alphabet::new(""), Err(Error::InvalidAlphabet(0)));
    }

    #[test]
    fn test_lookup_errors() {
        let a = Alphabet::digits();
        assert_eq!(a.index_of('7'), Ok(7));
        assert_eq!(a.index_of('x'), Err(Error::InvalidSymbol('x')));
        assert_eq!(a.symbol_at(9), Ok('9'));
        assert_eq!(
            a.symbol_at(10),
            Err(Error::OutOfRange {
                index: 10,
                radix: 10
            })
        );
    }

    #[test]
    fn test_derive_baseline_adds_extras_sorted() {
        let text: Vec<char> = "zé€a".chars().collect();
        let a = Alphabet::derive(&text, &Recipe::baseline(ClassSet::ALPHANUMERIC)).unwrap();
        assert_eq!(a.radix(), 64);
        assert_eq!(&a.symbols()[62..], &['é', '€']);
        assert_eq!(a.symbols()[0], '0');
    }

    #[test]
    fn test_derive_is_order_independent() {
        let recipe = Recipe::baseline(ClassSet::ALPHANUMERIC);
        let x: Vec<char> = "ăbî".chars().collect();
        let y: Vec<char> = "îxă".chars().collect();
        assert_eq!(
            Alphabet::derive(&x, &recipe).unwrap(),
            Alphabet::derive(&y, &recipe).unwrap()
        );
    }

    #[test]
    fn test_derive_closure_keeps_digits_digits() {
        let text: Vec<char> = "123456".chars().collect();
        let a = Alphabet::derive(&text, &Recipe::closure()).unwrap();
        assert_eq!(a, Alphabet::digits());
    }

    #[test]
    fn test_derive_closure_with_punctuation() {
        let text: Vec<char> = "ab.c".chars().collect();
        let a = Alphabet::derive(&text, &Recipe::closure()).unwrap();
        assert_eq!(a.radix(), 52 + PUNCTUATION.chars().count() as u32);
        assert!(!a.contains('0'));
        assert!(a.contains('@'));
    }

    #[test]
    fn test_derive_exclusion_respects_present_chars() {
        let recipe = Recipe::closure().excluding(['@', '.']);
        let a = Alphabet::derive(&"a.b".chars().collect::<Vec<_>>(), &recipe).unwrap();
        assert!(a.contains('.'));
        assert!(!a.contains('@'));
    }

    #[test]
    fn test_required_groups() {
        let baseline = Recipe::baseline(ClassSet::ALPHANUMERIC);
        let text: Vec<char> = "ab c€".chars().collect();
        let a = Alphabet::derive(&text, &baseline).unwrap();
        assert_eq!(baseline.required_groups(&a), vec![1, 1]);

        let closure = Recipe::closure().excluding(['-']);
        let text: Vec<char> = "a-1".chars().collect();
        let a = Alphabet::derive(&text, &closure).unwrap();
        let punctuation_kept = PUNCTUATION.chars().count() - 1;
        assert_eq!(closure.required_groups(&a), vec![10, 52, punctuation_kept, 1]);
    }

    #[test]
    fn test_derive_single_symbol_fails() {
        let text = ['€', '€'];
        assert_eq!(
            Alphabet::derive(&text, &Recipe::closure()),
            Err(Error::InvalidAlphabet(1))
        );
    }

    #[test]
    fn test_numeral_roundtrip() {
        let a = Alphabet::alphanumeric();
        let chars: Vec<char> = "Zz09".chars().collect();
        let numerals = a.to_numerals(&chars).unwrap();
        assert_eq!(numerals, vec![35, 61, 0, 9]);
        assert_eq!(a.to_symbols(&numerals).unwrap(), chars);
    }
}
