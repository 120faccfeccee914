//! Unit-of-measure normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical unit labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalUnit {
    /// Cubic metre.
    Cum,
    /// Square metre.
    Sqm,
    /// Running metre.
    Rmt,
    /// Count of pieces.
    Nos,
    /// Kilogram.
    Kg,
    /// Metric ton.
    Ton,
    /// Litre.
    Ltr,
}

impl CanonicalUnit {
    /// All canonical units.
    pub const ALL: [CanonicalUnit; 7] = [
        Self::Cum,
        Self::Sqm,
        Self::Rmt,
        Self::Nos,
        Self::Kg,
        Self::Ton,
        Self::Ltr,
    ];

    /// Label used in extracted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cum => "Cum",
            Self::Sqm => "Sqm",
            Self::Rmt => "Rmt",
            Self::Nos => "Nos",
            Self::Kg => "Kg",
            Self::Ton => "Ton",
            Self::Ltr => "Ltr",
        }
    }

    /// Match a raw token against the synonym table.
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        SYNONYMS.iter().find_map(|(unit, synonyms)| {
            synonyms
                .iter()
                .any(|s| s.matches(&lower))
                .then_some(*unit)
        })
    }
}

impl fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a synonym is compared against a lowercased token.
#[derive(Debug, Clone, Copy)]
enum Synonym {
    /// Token contains the synonym.
    Contains(&'static str),
    /// Token contains the synonym at the start of a word ("ton" in
    /// "tonnes" but not in "carton").
    WordStart(&'static str),
    /// Token equals the synonym. Used for abbreviations short enough to
    /// appear inside unrelated words ("rm" in "form", "no" in "nominal").
    Exact(&'static str),
}

impl Synonym {
    fn matches(&self, lower: &str) -> bool {
        match self {
            Synonym::Contains(s) => lower.contains(s),
            Synonym::WordStart(s) => lower
                .match_indices(s)
                .any(|(i, _)| !lower[..i].chars().next_back().is_some_and(char::is_alphabetic)),
            Synonym::Exact(s) => lower.trim_end_matches('.') == *s,
        }
    }
}

// Ordered: Nos comes last so "cu.m nos" style noise resolves to the physical unit.
const SYNONYMS: &[(CanonicalUnit, &[Synonym])] = &[
    (
        CanonicalUnit::Cum,
        &[
            Synonym::WordStart("cum"),
            Synonym::Contains("cu.m"),
            Synonym::Contains("cu m"),
            Synonym::Contains("cubic"),
            Synonym::Contains("m3"),
            Synonym::Contains("m³"),
        ],
    ),
    (
        CanonicalUnit::Sqm,
        &[
            Synonym::Contains("sqm"),
            Synonym::Contains("sq.m"),
            Synonym::Contains("sq m"),
            Synonym::Contains("square"),
            Synonym::Contains("m2"),
            Synonym::Contains("m²"),
        ],
    ),
    (
        CanonicalUnit::Rmt,
        &[
            Synonym::Contains("rmt"),
            Synonym::Contains("r.m"),
            Synonym::Contains("running"),
            Synonym::Exact("rm"),
        ],
    ),
    (
        CanonicalUnit::Kg,
        &[Synonym::Contains("kg"), Synonym::Contains("kilogram")],
    ),
    (
        CanonicalUnit::Ton,
        &[
            Synonym::WordStart("ton"),
            Synonym::Exact("mt"),
            Synonym::Exact("t"),
        ],
    ),
    (
        CanonicalUnit::Ltr,
        &[
            Synonym::Contains("ltr"),
            Synonym::Contains("litre"),
            Synonym::Contains("liter"),
            Synonym::Exact("l"),
        ],
    ),
    (
        CanonicalUnit::Nos,
        &[
            Synonym::Contains("nos"),
            Synonym::Contains("number"),
            Synonym::Contains("each"),
            Synonym::Contains("pcs"),
            Synonym::Contains("piece"),
            Synonym::Exact("no"),
            Synonym::Exact("ea"),
            Synonym::Exact("pc"),
        ],
    ),
];

/// Canonicalize a raw unit token.
///
/// Known synonyms map to a [`CanonicalUnit`] label. Unknown tokens are kept
/// (trimmed) when they contain a letter; anything else, including numbers
/// that leaked into a unit column, becomes `Nos`.
pub fn normalize_unit(raw: &str) -> String {
    if let Some(unit) = CanonicalUnit::from_token(raw) {
        return unit.as_str().to_string();
    }

    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_alphabetic) {
        trimmed.to_string()
    } else {
        CanonicalUnit::Nos.as_str().to_string()
    }
}
