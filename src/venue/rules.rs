/// A keyword rule mapping a cleaned venue string onto a canonical label.
pub struct Rule {
    pub label: &'static str,
    /// Tested against the lowercased, cleaned venue string.
    matches: fn(&str) -> bool,
}

/// Heuristics for the venues that show up most often.
///
/// NOTE: Ordering is important here, as it signifies priority. If two rules match a given venue,
/// the first one to show up in this list wins.
static RULES: &[Rule] = &[
    Rule {
        label: "arXiv",
        matches: |s| s.contains("arxiv") || s.contains("corr"),
    },
    Rule {
        label: "ACM RecSys",
        matches: |s| s.contains("recsys"),
    },
    Rule {
        label: "ACM CHI",
        matches: |s| s.contains("chi") && (s.contains("human factors") || s == "chi"),
    },
    Rule {
        label: "ACM TOCHI",
        matches: |s| s.contains("human-computer interaction"),
    },
    Rule {
        label: "ACM IUI",
        matches: |s| s.contains("iui") && s.contains("intelligent"),
    },
    Rule {
        label: "ACM CSCW",
        matches: |s| s.contains("cscw"),
    },
    Rule {
        label: "ACM UMAP",
        matches: |s| s.contains("user modeling") && s.contains("adaptation"),
    },
    Rule {
        label: "ACM ToRS",
        matches: |s| s.contains("transactions on recommender systems"),
    },
    Rule {
        label: "IEEE CVPR",
        matches: |s| s.contains("computer vision") && s.contains("pattern recognition"),
    },
    Rule {
        label: "IEEE ICRA",
        matches: |s| s.contains("icra"),
    },
    Rule {
        label: "IEEE TVCG",
        matches: |s| s.contains("visualization") && s.contains("computer graphics"),
    },
    Rule {
        label: "IEEE Access",
        matches: |s| s.contains("access") && s.contains("ieee"),
    },
];

/// Find the canonical label of the first rule matching `cleaned`, if any.
pub fn classify(cleaned: &str) -> Option<&'static str> {
    let lower = cleaned.to_lowercase();
    RULES.iter().find(|r| (r.matches)(&lower)).map(|r| r.label)
}

/// Every label the heuristics can produce.
#[cfg(test)]
pub fn labels() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|r| r.label)
}
