pub mod candidate_matcher;
pub mod normalizer;

pub use candidate_matcher::{CandidateMatcher, DuplicateMatch, MatchKind, DUPLICATE_THRESHOLD};
pub use normalizer::{normalize, similarity, title_is_relevant, token_set};
