//! Venue name canonicalisation.
//!
//! Free-text venue strings come in with abbreviations, organisation prefixes, years, ordinals and
//! proceedings boilerplate. [`Normalizer::normalize`] collapses them onto short canonical labels
//! (e.g. "ACM CHI", "arXiv") so that the graph and the diet hierarchy group them together.

use std::{collections::HashMap, fs, io, path::Path};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub mod kind;
pub mod rules;

/// Returned for empty input, or input that cleans down to nothing.
pub const UNKNOWN_VENUE: &str = "Unknown Venue";

/// Organisation prefixes, in detection priority.
const ORGANISATIONS: &[&str] = &["ACM", "IEEE", "AAAI"];

/// Curated exact-match exceptions, consulted before and after the automated cleanup.
#[derive(Debug, Clone, Default)]
pub struct VenueMap {
    entries: HashMap<String, String>,
}

impl VenueMap {
    /// Load the table from a flat JSON object of strings. A missing file yields an empty table.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "venue map not found, using an empty one");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let entries: HashMap<String, String> = serde_json::from_str(&body)
            .with_context(|| format!("malformed venue map at {}", path.display()))?;
        debug!(path = %path.display(), entries = entries.len(), "loaded venue map");
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VenueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Substitutions applied in sequence during cleanup, each on the result of the previous one.
///
/// Removals leave a space behind so that text on either side is never joined into a new token.
static CLEANUP: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)Proceedings of (the )?", " "),
        (r"(?i)International Conference on", " "),
        (r"(?i)\bConference on\b", " "),
        (r"(?i)\bSymposium on\b", " "),
        (r"(?i)\bAnnual Meeting (of the)?\b", " "),
        (r"(?i)\bWorkshop on\b", "Workshop:"),
        // Years, optionally parenthesised: "2024", "(2024)".
        (r"[\(\s]*\b(19|20)\d{2}\b[\)\s]*", " "),
        // Short years: "'24".
        (r"'\d{2}\b", " "),
        (r"(?i)\b\d{1,2}(st|nd|rd|th)\b", " "),
        (r"(?i)\bACM\b", " "),
        (r"(?i)\bIEEE\b", " "),
        (r"(?i)\bAAAI\b", " "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Turns raw venue strings into canonical venue labels.
///
/// The override table is fixed at construction time; build one normalizer and share it between
/// jobs.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    overrides: VenueMap,
}

impl Normalizer {
    pub fn new(overrides: VenueMap) -> Self {
        Self { overrides }
    }

    /// Canonicalise `raw`. Never fails; unrecognised venues come back cleaned but otherwise as-is.
    pub fn normalize(&self, raw: &str) -> String {
        let name = collapse_whitespace(raw);
        if name.is_empty() {
            return UNKNOWN_VENUE.to_string();
        }

        if let Some(mapped) = self.overrides.get(&name) {
            return mapped.to_string();
        }

        // Remembered now, stripped from the body during cleanup, re-attached in the fallback.
        let prefix = ORGANISATIONS.iter().find(|org| name.contains(*org));

        let clean = clean(&name);

        if let Some(mapped) = self.overrides.get(&clean) {
            return mapped.to_string();
        }

        if let Some(label) = rules::classify(&clean) {
            return label.to_string();
        }

        let last = match prefix {
            Some(org) => collapse_whitespace(&format!("{org} {clean}")),
            None => clean,
        };
        if let Some(mapped) = self.overrides.get(&last) {
            return mapped.to_string();
        }
        if last.is_empty() {
            return UNKNOWN_VENUE.to_string();
        }
        last
    }
}

/// Strip boilerplate, years, ordinals and organisation names from a whitespace-normalised name.
///
/// Removing one token can bring two others together into a phrase an earlier pattern looks for
/// ("Symposium 2021 on"), so passes repeat until the name stops changing. Every pass either
/// shortens the name or drops an '&', so this terminates.
fn clean(name: &str) -> String {
    let mut current = clean_once(name);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(name: &str) -> String {
    let stripped = CLEANUP
        .iter()
        .fold(name.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        })
        .replace('&', " ");

    collapse_whitespace(&stripped)
        .trim_matches(|c: char| matches!(c, ' ' | '-' | ':' | ','))
        .to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
