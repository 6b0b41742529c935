use super::normalizer::{normalize, similarity};
use serde::Serialize;

/// Fuzzy matches at or above this score are reported as duplicates.
pub const DUPLICATE_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MatchKind {
    /// Normalized names are identical.
    Exact,
    /// Token similarity crossed the threshold.
    Fuzzy { score: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateMatch {
    pub venue_id: String,
    pub venue_name: String,
    pub kind: MatchKind,
}

/// Duplicate detector over (id, name) candidate lists.
///
/// Callers pass every candidate except the record under inspection; the
/// matcher itself does no id filtering.
pub struct CandidateMatcher {
    threshold: f64,
}

impl CandidateMatcher {
    pub fn new() -> Self {
        Self {
            threshold: DUPLICATE_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Best duplicate candidate for `name`, if any.
    ///
    /// An exact normalized match wins immediately; otherwise the highest
    /// scoring fuzzy candidate is returned when it reaches the threshold.
    pub fn find_duplicate(
        &self,
        name: &str,
        candidates: &[(String, String)],
    ) -> Option<DuplicateMatch> {
        let target = normalize(name);
        let mut best: Option<(f64, &(String, String))> = None;

        for candidate in candidates {
            if normalize(&candidate.1) == target {
                return Some(DuplicateMatch {
                    venue_id: candidate.0.clone(),
                    venue_name: candidate.1.clone(),
                    kind: MatchKind::Exact,
                });
            }

            let score = similarity(name, &candidate.1);
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, candidate)) if score >= self.threshold => Some(DuplicateMatch {
                venue_id: candidate.0.clone(),
                venue_name: candidate.1.clone(),
                kind: MatchKind::Fuzzy { score },
            }),
            _ => None,
        }
    }
}

impl Default for CandidateMatcher {
    fn default() -> Self {
        Self::new()
    }
}
