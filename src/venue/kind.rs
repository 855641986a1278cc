use serde::Serialize;

/// Display hint for impact-graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Journal,
    Conference,
    Preprint,
}

impl NodeKind {
    const CONFERENCE_HINTS: &'static [&'static str] = &[
        "proc",
        "conference",
        "symposium",
        "workshop",
        "meeting",
        "acm",
        "ieee",
    ];

    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if ["arxiv", "preprint", "corr"].iter().any(|k| lower.contains(k)) {
            NodeKind::Preprint
        } else if Self::CONFERENCE_HINTS.iter().any(|k| lower.contains(k)) {
            NodeKind::Conference
        } else {
            NodeKind::Journal
        }
    }
}

/// Top-level bucket of the citation diet hierarchy.
///
/// Declaration order is the order buckets appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum VenueType {
    Journal,
    Conference,
    Workshop,
    Preprint,
}

impl VenueType {
    /// Abbreviations of journals that the normalizer emits without the word "journal".
    const JOURNAL_ABBREVIATIONS: &'static [&'static str] = &["tvcg", "tochi", "tors"];

    pub fn classify(canonical: &str) -> Self {
        let lower = canonical.to_lowercase();
        let is_abbreviation = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| Self::JOURNAL_ABBREVIATIONS.contains(&w));

        if lower.contains("arxiv") || lower.contains("preprint") {
            VenueType::Preprint
        } else if lower.contains("journal") || lower.contains("transactions") || is_abbreviation {
            VenueType::Journal
        } else if lower.contains("workshop") {
            VenueType::Workshop
        } else {
            VenueType::Conference
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VenueType::Journal => "Journal",
            VenueType::Conference => "Conference",
            VenueType::Workshop => "Workshop",
            VenueType::Preprint => "Preprint",
        }
    }
}
