//! Field-specific anonymizers built on the preservation adapter.
//!
//! Each anonymizer is a thin policy layer: it picks preserved characters,
//! patterns or a working alphabet for one kind of field and hands the
//! actual transform to [`Adapter`] or the cycle-walking engine.

use std::collections::BTreeSet;

use crate::adapter::{Adapter, AdapterConfig};
use crate::alphabet::{Alphabet, ClassSet};
use crate::common::{Direction, Error, PUNCTUATION, Result};
use crate::ff3::Ff3Cipher;
use crate::walk::cycle_walk;

/// Romanian CNP: birth date prefix kept, serial and checksum transformed.
pub const ROMANIAN_CNP_PATTERN: &str = r"^\d{6}(\d{7})$";

/// US SSN without separators: last four digits kept.
pub const SSN_PATTERN: &str = r"^(\d{5})\d{4}$";

/// Common interface of all anonymizers.
pub trait Anonymizer {
    fn anonymize(&self, input: &str) -> Result<String>;

    fn deanonymize(&self, input: &str) -> Result<String>;

    /// Characters that keep their exact positions.
    fn set_preserve_characters(&mut self, chars: &[char]);

    /// Regular expression whose capturing groups are the only transformed
    /// parts. An empty pattern clears it.
    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()>;
}

impl Anonymizer for Adapter {
    fn anonymize(&self, input: &str) -> Result<String> {
        Adapter::anonymize(self, input)
    }

    fn deanonymize(&self, input: &str) -> Result<String> {
        Adapter::deanonymize(self, input)
    }

    fn set_preserve_characters(&mut self, chars: &[char]) {
        Adapter::set_preserve_characters(self, chars.iter().copied());
    }

    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        Adapter::set_preserve_pattern(self, pattern)
    }
}

/// Free text with optional space and punctuation preservation.
#[derive(Clone)]
pub struct StringAnonymizer {
    adapter: Adapter,
    preserved: BTreeSet<char>,
    preserve_spaces: bool,
    preserve_punctuation: bool,
}

impl StringAnonymizer {
    pub fn new(cipher: Ff3Cipher) -> Self {
        Self {
            adapter: Adapter::new(cipher),
            preserved: BTreeSet::new(),
            preserve_spaces: false,
            preserve_punctuation: false,
        }
    }

    /// Keep spaces in place so word boundaries survive.
    pub fn preserve_spaces(mut self, enabled: bool) -> Self {
        self.preserve_spaces = enabled;
        self.sync();
        self
    }

    /// Keep the builtin punctuation set in place.
    pub fn preserve_punctuation(mut self, enabled: bool) -> Self {
        self.preserve_punctuation = enabled;
        self.sync();
        self
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    fn sync(&mut self) {
        let mut chars = self.preserved.clone();
        if self.preserve_spaces {
            chars.insert(' ');
        }
        if self.preserve_punctuation {
            chars.extend(PUNCTUATION.chars());
        }
        self.adapter.set_preserve_characters(chars);
    }
}

impl Anonymizer for StringAnonymizer {
    fn anonymize(&self, input: &str) -> Result<String> {
        self.adapter.anonymize(input)
    }

    fn deanonymize(&self, input: &str) -> Result<String> {
        self.adapter.deanonymize(input)
    }

    fn set_preserve_characters(&mut self, chars: &[char]) {
        self.preserved = chars.iter().copied().collect();
        self.sync();
    }

    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        self.adapter.set_preserve_pattern(pattern)
    }
}

/// Digit strings such as account or card numbers.
///
/// Input must consist of ASCII digits and preserved characters only; the
/// output is again a digit string of the same length.
#[derive(Clone)]
pub struct NumberStringAnonymizer {
    adapter: Adapter,
}

impl NumberStringAnonymizer {
    pub fn new(cipher: Ff3Cipher) -> Self {
        let config = AdapterConfig::default().with_baseline(ClassSet::DIGITS);
        Self {
            adapter: Adapter::with_config(cipher, config),
        }
    }

    fn validate(&self, input: &str) -> Result<()> {
        let preserved = self.adapter.preserve_characters();
        match input
            .chars()
            .find(|c| !c.is_ascii_digit() && !preserved.contains(c))
        {
            Some(c) => Err(Error::InvalidSymbol(c)),
            None => Ok(()),
        }
    }
}

impl Anonymizer for NumberStringAnonymizer {
    fn anonymize(&self, input: &str) -> Result<String> {
        self.validate(input)?;
        self.adapter.anonymize(input)
    }

    fn deanonymize(&self, input: &str) -> Result<String> {
        self.validate(input)?;
        self.adapter.deanonymize(input)
    }

    fn set_preserve_characters(&mut self, chars: &[char]) {
        self.adapter.set_preserve_characters(chars.iter().copied());
    }

    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        self.adapter.set_preserve_pattern(pattern)
    }
}

/// Email addresses, split at the last `@`.
///
/// The local part is transformed with dots and underscores optionally kept
/// in place. The domain is kept by default; otherwise it is transformed with
/// its dots kept. Text without `@` is treated as a bare local part.
#[derive(Clone)]
pub struct EmailAnonymizer {
    local: Adapter,
    domain: Adapter,
    preserved: BTreeSet<char>,
    preserve_dots: bool,
    preserve_underscores: bool,
    preserve_domain: bool,
}

impl EmailAnonymizer {
    pub fn new(cipher: Ff3Cipher) -> Self {
        let mut domain = Adapter::new(cipher.clone());
        domain.set_preserve_characters(['.']);
        let mut email = Self {
            local: Adapter::new(cipher),
            domain,
            preserved: BTreeSet::new(),
            preserve_dots: true,
            preserve_underscores: true,
            preserve_domain: true,
        };
        email.sync();
        email
    }

    pub fn preserve_domain(mut self, enabled: bool) -> Self {
        self.preserve_domain = enabled;
        self
    }

    pub fn preserve_dots(mut self, enabled: bool) -> Self {
        self.preserve_dots = enabled;
        self.sync();
        self
    }

    pub fn preserve_underscores(mut self, enabled: bool) -> Self {
        self.preserve_underscores = enabled;
        self.sync();
        self
    }

    fn sync(&mut self) {
        let mut chars = self.preserved.clone();
        if self.preserve_dots {
            chars.insert('.');
        }
        if self.preserve_underscores {
            chars.insert('_');
        }
        self.local.set_preserve_characters(chars);
    }

    fn run(&self, input: &str, direction: Direction) -> Result<String> {
        let crypt = |adapter: &Adapter, text: &str| match direction {
            Direction::Encrypt => adapter.anonymize(text),
            Direction::Decrypt => adapter.deanonymize(text),
        };

        let Some((local, domain)) = input.rsplit_once('@') else {
            return crypt(&self.local, input);
        };
        let local = crypt(&self.local, local)?;
        let domain = if self.preserve_domain {
            domain.to_string()
        } else {
            crypt(&self.domain, domain)?
        };
        Ok(format!("{local}@{domain}"))
    }
}

impl Anonymizer for EmailAnonymizer {
    fn anonymize(&self, input: &str) -> Result<String> {
        self.run(input, Direction::Encrypt)
    }

    fn deanonymize(&self, input: &str) -> Result<String> {
        self.run(input, Direction::Decrypt)
    }

    /// Applies to the local part, on top of the dot and underscore switches.
    fn set_preserve_characters(&mut self, chars: &[char]) {
        self.preserved = chars.iter().copied().collect();
        self.sync();
    }

    /// Applies to the local part.
    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        self.local.set_preserve_pattern(pattern)
    }
}

/// National identifiers with presets for known layouts.
#[derive(Clone)]
pub struct PersonalIdentifierAnonymizer {
    adapter: Adapter,
}

impl PersonalIdentifierAnonymizer {
    pub fn new(cipher: Ff3Cipher) -> Self {
        Self {
            adapter: Adapter::new(cipher),
        }
    }

    pub fn configure_for_romanian_cnp(&mut self) -> Result<()> {
        self.adapter.set_preserve_pattern(ROMANIAN_CNP_PATTERN)
    }

    /// Separators are kept in place, so `123-45-6789` matches as well.
    pub fn configure_for_ssn(&mut self) -> Result<()> {
        self.adapter.set_preserve_characters(['-', ' ']);
        self.adapter.set_preserve_pattern(SSN_PATTERN)
    }
}

impl Anonymizer for PersonalIdentifierAnonymizer {
    fn anonymize(&self, input: &str) -> Result<String> {
        self.adapter.anonymize(input)
    }

    fn deanonymize(&self, input: &str) -> Result<String> {
        self.adapter.deanonymize(input)
    }

    fn set_preserve_characters(&mut self, chars: &[char]) {
        self.adapter.set_preserve_characters(chars.iter().copied());
    }

    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        self.adapter.set_preserve_pattern(pattern)
    }
}

/// Personal names, one word at a time under the lowercase alphabet.
///
/// Words are split at the preserved characters (a space unless configured
/// otherwise), which stay in place. A leading capital is restored on the
/// output word; other capitals are not. Patterns are not supported.
#[derive(Clone)]
pub struct NameAnonymizer {
    cipher: Ff3Cipher,
    separators: BTreeSet<char>,
    preserve_capitalization: bool,
    max_cycle_walks: usize,
}

impl NameAnonymizer {
    pub fn new(cipher: Ff3Cipher) -> Self {
        Self {
            cipher: cipher.with_alphabet(Alphabet::lower_alpha()),
            separators: BTreeSet::from([' ']),
            preserve_capitalization: true,
            max_cycle_walks: AdapterConfig::default().max_cycle_walks,
        }
    }

    pub fn preserve_capitalization(mut self, enabled: bool) -> Self {
        self.preserve_capitalization = enabled;
        self
    }

    fn run(&self, name: &str, direction: Direction) -> Result<String> {
        let mut out = String::with_capacity(name.len());
        let mut word = String::new();
        for c in name.chars() {
            if self.separators.contains(&c) {
                out.push_str(&self.word(&word, direction)?);
                out.push(c);
                word.clear();
            } else {
                word.push(c);
            }
        }
        out.push_str(&self.word(&word, direction)?);
        Ok(out)
    }

    fn word(&self, word: &str, direction: Direction) -> Result<String> {
        if word.is_empty() {
            return Ok(String::new());
        }
        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        let lower: Vec<char> = word.chars().map(|c| c.to_ascii_lowercase()).collect();
        if let Some(&c) = lower.iter().find(|c| !c.is_ascii_lowercase()) {
            return Err(Error::InvalidSymbol(c));
        }

        let mut out = cycle_walk(&self.cipher, &lower, 'a', self.max_cycle_walks, direction, |_| true)?;
        if self.preserve_capitalization
            && capitalized
            && let Some(first) = out.first_mut()
        {
            *first = first.to_ascii_uppercase();
        }
        Ok(out.into_iter().collect())
    }
}

impl Anonymizer for NameAnonymizer {
    fn anonymize(&self, input: &str) -> Result<String> {
        self.run(input, Direction::Encrypt)
    }

    fn deanonymize(&self, input: &str) -> Result<String> {
        self.run(input, Direction::Decrypt)
    }

    fn set_preserve_characters(&mut self, chars: &[char]) {
        self.separators = chars.iter().copied().collect();
    }

    fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        if pattern.is_empty() {
            return Ok(());
        }
        Err(Error::InvalidPattern(
            "names are transformed word by word".into(),
        ))
    }
}
