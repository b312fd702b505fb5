//! Name-based and shape-based target scores
//!
//! Each scorer is an independent pure function; the target resolver adds
//! them together with the domain bonus and the association signal.

use super::domain::{keywords, Domain, TARGET_KEYWORDS};
use super::profile::{ColumnKind, ColumnProfile};

/// Points per ontology word found in a column name
pub const SEMANTIC_WEIGHT: f64 = 6.0;

/// Bonus when the name contains a word from the inferred domain's bucket
pub const DOMAIN_BONUS: f64 = 5.0;

/// Score given to row identifiers; no other addend can recover from it
pub const IDENTIFIER_SCORE: f64 = -1000.0;

/// Score a column name against the whole keyword ontology.
///
/// Every matching word counts, in every category it is listed under.
pub fn semantic_score(column_name: &str) -> f64 {
    let name = column_name.to_lowercase();
    let hits = TARGET_KEYWORDS
        .iter()
        .flat_map(|(_, words)| words.iter())
        .filter(|word| name.contains(*word))
        .count();
    SEMANTIC_WEIGHT * hits as f64
}

/// Score a column by its shape: density, cardinality and type
pub fn statistical_score(profile: &ColumnProfile) -> f64 {
    if profile.is_identifier() {
        return IDENTIFIER_SCORE;
    }

    let mut score = 0.0;

    if profile.missing_ratio() < 0.1 {
        score += 2.0;
    }

    let unique_ratio = profile.unique_ratio();
    if unique_ratio < 0.05 {
        score += 3.0;
    } else if unique_ratio > 0.9 {
        score -= 4.0;
    }

    let distinct = profile.unique_count;
    if profile.kind == ColumnKind::Boolean || distinct == 2 {
        score += 5.0;
    } else if !profile.is_numeric() {
        score += 3.0;
    } else if distinct <= 10 {
        score += 4.0;
    } else if distinct <= 30 {
        score += 3.0;
    } else {
        score += 2.0;
    }

    score
}

/// Bonus for names that mention a keyword of the dataset's domain
pub fn domain_bonus(column_name: &str, domain: Domain) -> f64 {
    let name = column_name.to_lowercase();
    if keywords(domain.keyword_category())
        .iter()
        .any(|word| name.contains(word))
    {
        DOMAIN_BONUS
    } else {
        0.0
    }
}
