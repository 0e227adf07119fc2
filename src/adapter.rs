//! Preservation adapter: FF3-1 over free-form text.
//!
//! The adapter lets callers encrypt text containing characters outside any
//! single working alphabet. Two strategies are available and may be combined:
//!
//! - character preservation: configured characters keep their exact
//!   positions, everything else is encrypted as one segment;
//! - pattern preservation: only the capturing groups of a regular expression
//!   are encrypted, one group at a time; uncaptured text is left as is. Each
//!   group is walked until the pattern matches the result again with the
//!   same group boundaries, so decryption finds the same groups.
//!
//! When both are configured, preserved characters are stripped first and the
//! pattern runs over what remains.
//!
//! Every segment is encrypted under an alphabet derived from the segment
//! itself. Segments the derived alphabet cannot carry are degraded to a
//! sanitize-and-retry path under the default alphabet; degradation is
//! reported through [`Transformed`] and logged at `warn` level.
//!
//! Anonymize and deanonymize recompute everything from their input and the
//! configuration; no state is kept between calls.

use std::collections::BTreeSet;
use std::ops::Range;

use log::{debug, warn};
use regex::Regex;

use crate::alphabet::{Alphabet, ClassSet, Recipe};
use crate::common::{DEFAULT_FILLER, DEFAULT_SENTINEL, Direction, Error, Result};
use crate::ff3::Ff3Cipher;
use crate::splice::{replace_span, strip};
use crate::walk::derived_transform;

/// Tunables for the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Padding symbol for short segments.
    pub filler: char,
    /// Replacement for characters outside the default alphabet on the fallback path.
    pub sentinel: char,
    /// Cycle-walk bound before a segment counts as unrepresentable.
    pub max_cycle_walks: usize,
    /// Whether unrepresentable segments go through sanitize-and-retry.
    pub fallback: bool,
    /// Classes always included when deriving whole-text alphabets.
    pub baseline: ClassSet,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            filler: DEFAULT_FILLER,
            sentinel: DEFAULT_SENTINEL,
            max_cycle_walks: 100_000,
            fallback: true,
            baseline: ClassSet::ALPHANUMERIC,
        }
    }
}

impl AdapterConfig {
    pub fn with_filler(mut self, filler: char) -> Self {
        self.filler = filler;
        self
    }

    pub fn with_sentinel(mut self, sentinel: char) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_max_cycle_walks(mut self, max_cycle_walks: usize) -> Self {
        self.max_cycle_walks = max_cycle_walks;
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_baseline(mut self, baseline: ClassSet) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Result of an adapter call together with how it was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    /// Segments transformed on the sanitize path. Lossy on round trip.
    pub fallbacks: usize,
    /// Segments returned unchanged because even the fallback failed
    /// (deanonymize only).
    pub passthroughs: usize,
}

impl Transformed {
    pub fn is_degraded(&self) -> bool {
        self.fallbacks > 0 || self.passthroughs > 0
    }
}

#[derive(Default)]
struct Tally {
    fallbacks: usize,
    passthroughs: usize,
}

/// FF3-1 with character and pattern preservation.
#[derive(Clone)]
pub struct Adapter {
    cipher: Ff3Cipher,
    config: AdapterConfig,
    preserve_chars: BTreeSet<char>,
    pattern: Option<Regex>,
}

impl Adapter {
    pub fn new(cipher: Ff3Cipher) -> Self {
        Self::with_config(cipher, AdapterConfig::default())
    }

    pub fn with_config(cipher: Ff3Cipher, config: AdapterConfig) -> Self {
        Self {
            cipher,
            config,
            preserve_chars: BTreeSet::new(),
            pattern: None,
        }
    }

    pub fn cipher(&self) -> &Ff3Cipher {
        &self.cipher
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AdapterConfig) {
        self.config = config;
    }

    /// Keep these characters at their original positions. Replaces any
    /// previous set; an empty set disables character preservation.
    pub fn set_preserve_characters<I: IntoIterator<Item = char>>(&mut self, chars: I) {
        self.preserve_chars = chars.into_iter().collect();
    }

    pub fn preserve_characters(&self) -> &BTreeSet<char> {
        &self.preserve_chars
    }

    /// Encrypt only the capturing groups of `pattern`. An empty pattern
    /// disables pattern preservation.
    ///
    /// # Errors
    /// `Error::InvalidPattern` if the pattern does not compile or has no
    /// capturing group.
    pub fn set_preserve_pattern(&mut self, pattern: &str) -> Result<()> {
        if pattern.is_empty() {
            self.pattern = None;
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(Error::InvalidPattern(format!(
                "{pattern:?} has no capturing group"
            )));
        }
        self.pattern = Some(regex);
        Ok(())
    }

    pub fn preserve_pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Regex::as_str)
    }

    pub fn anonymize(&self, input: &str) -> Result<String> {
        self.anonymize_detailed(input).map(|t| t.text)
    }

    pub fn deanonymize(&self, input: &str) -> Result<String> {
        self.deanonymize_detailed(input).map(|t| t.text)
    }

    /// Anonymize and report whether any segment was degraded.
    pub fn anonymize_detailed(&self, input: &str) -> Result<Transformed> {
        self.run(input, Direction::Encrypt)
    }

    /// Deanonymize and report whether any segment was degraded.
    pub fn deanonymize_detailed(&self, input: &str) -> Result<Transformed> {
        self.run(input, Direction::Decrypt)
    }

    fn run(&self, input: &str, direction: Direction) -> Result<Transformed> {
        let chars: Vec<char> = input.chars().collect();
        let (body, preserved) = strip(&chars, |c| self.preserve_chars.contains(&c));
        if body.is_empty() {
            return Ok(Transformed {
                text: input.to_string(),
                ..Transformed::default()
            });
        }

        let mut tally = Tally::default();
        let out = match &self.pattern {
            Some(regex) => {
                debug!("{:?} with pattern {:?}", direction, regex.as_str());
                self.transform_pattern(regex, &body, direction, &mut tally)?
            }
            None => {
                debug!(
                    "{:?} whole text, {} preserved positions",
                    direction,
                    preserved.len()
                );
                let recipe = Recipe::baseline(self.config.baseline)
                    .excluding(self.preserve_chars.iter().copied());
                self.segment(&body, &recipe, direction, |_| true, &mut tally)?
            }
        };

        Ok(Transformed {
            text: preserved.restore(out).into_iter().collect(),
            fallbacks: tally.fallbacks,
            passthroughs: tally.passthroughs,
        })
    }

    fn transform_pattern(
        &self,
        regex: &Regex,
        body: &[char],
        direction: Direction,
        tally: &mut Tally,
    ) -> Result<Vec<char>> {
        let Some(layout) = pattern_layout(regex, body) else {
            debug!("pattern did not match, transforming whole text");
            let recipe = Recipe::closure().excluding(self.preserve_chars.iter().copied());
            let unmatched = |candidate: &[char]| {
                let candidate: String = candidate.iter().collect();
                !regex.is_match(&candidate)
            };
            return self.segment(body, &recipe, direction, unmatched, tally);
        };

        let recipe = Recipe::closure()
            .excluding(self.preserve_chars.iter().copied())
            .excluding(literal_delimiters(body, &layout));

        // Encryption goes left to right, decryption undoes it right to left,
        // so every group is walked against the same surrounding text.
        let mut order = layout.groups.clone();
        if direction == Direction::Decrypt {
            order.reverse();
        }

        let mut current = body.to_vec();
        for span in order {
            let group = current[span.clone()].to_vec();
            let keeps_layout = |candidate: &[char]| {
                let spliced = replace_span(&current, span.clone(), candidate);
                pattern_layout(regex, &spliced).is_some_and(|found| found == layout)
            };
            let out = self.segment(&group, &recipe, direction, keeps_layout, tally)?;
            current = replace_span(&current, span, &out);
        }
        Ok(current)
    }

    fn segment<F>(
        &self,
        text: &[char],
        recipe: &Recipe,
        direction: Direction,
        extra: F,
        tally: &mut Tally,
    ) -> Result<Vec<char>>
    where
        F: Fn(&[char]) -> bool,
    {
        let result = derived_transform(
            &self.cipher,
            text,
            recipe,
            self.config.filler,
            self.config.max_cycle_walks,
            direction,
            extra,
        );
        match result {
            Err(err) if err.is_representability() && self.config.fallback => {
                warn!(
                    "segment of {} symbols not representable ({}), using sanitized fallback",
                    text.len(),
                    err
                );
                self.fallback(text, direction, tally)
            }
            other => other,
        }
    }

    /// Replace unsafe characters with the sentinel and retry under the
    /// default alphabet.
    fn fallback(&self, text: &[char], direction: Direction, tally: &mut Tally) -> Result<Vec<char>> {
        let alphabet = Alphabet::default();
        let sentinel = self.config.sentinel;
        let n = text.len();

        let mut sanitized: Vec<char> = text
            .iter()
            .map(|&c| if alphabet.contains(c) { c } else { sentinel })
            .collect();
        sanitized.resize(n.max(alphabet.min_length()), sentinel);

        let cipher = self.cipher.with_alphabet(alphabet);
        match cipher.crypt_chunked(&sanitized, direction) {
            Ok(mut out) => {
                out.truncate(n);
                tally.fallbacks += 1;
                Ok(out)
            }
            Err(err) if direction == Direction::Decrypt => {
                warn!("fallback failed ({}), returning segment unchanged", err);
                tally.passthroughs += 1;
                Ok(text.to_vec())
            }
            Err(err) => Err(err),
        }
    }
}

/// Where a pattern matched, in character indices.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    whole: Range<usize>,
    /// Outermost non-empty participating groups, in text order.
    groups: Vec<Range<usize>>,
}

fn pattern_layout(regex: &Regex, text: &[char]) -> Option<Layout> {
    let text: String = text.iter().collect();
    let caps = regex.captures(&text)?;

    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_index = |byte: usize| boundaries.partition_point(|&b| b < byte);
    let span = |m: regex::Match<'_>| char_index(m.start())..char_index(m.end());

    let whole = span(caps.get(0)?);
    let mut spans: Vec<Range<usize>> = caps
        .iter()
        .skip(1)
        .flatten()
        .filter(|m| !m.is_empty())
        .map(span)
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut groups: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        if groups.last().is_some_and(|last| span.start < last.end) {
            continue;
        }
        groups.push(span);
    }
    Some(Layout { whole, groups })
}

/// Non-alphanumeric characters of the match that lie outside every group.
fn literal_delimiters(text: &[char], layout: &Layout) -> BTreeSet<char> {
    layout
        .whole
        .clone()
        .filter(|pos| !layout.groups.iter().any(|g| g.contains(pos)))
        .map(|pos| text[pos])
        .filter(|c| !c.is_ascii_alphanumeric())
        .collect()
}
