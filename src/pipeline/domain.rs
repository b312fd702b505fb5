//! Target keyword ontology and coarse domain inference
//!
//! Both tables are fixed lookup data; nothing here is mutable at runtime.

use serde::{Deserialize, Serialize};

/// Keyword category in the target ontology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    Generic,
    Events,
    Business,
    Medical,
    Finance,
    Education,
}

const GENERIC_KEYWORDS: &[&str] = &[
    "target", "label", "class", "output", "result", "y", "response", "prediction", "predicted",
    "outcome", "status", "flag", "decision", "category", "type",
];

const EVENT_KEYWORDS: &[&str] = &[
    "event", "death", "deceased", "default", "churn", "fraud", "failure", "survived", "passed",
    "dropout", "termination", "incident", "occurrence", "accident", "collapse",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "price", "sales", "revenue", "profit", "loss", "cost", "income", "margin", "turnover",
    "demand", "supply", "growth", "roi", "valuation", "expense",
];

const MEDICAL_KEYWORDS: &[&str] = &[
    "mortality", "diagnosis", "diabetes", "death", "survival", "disease", "outcome", "prognosis",
    "recovery", "severity", "risk", "condition", "treatment", "complication", "relapse",
];

const FINANCE_KEYWORDS: &[&str] = &[
    "credit", "loan", "risk", "score", "default", "balance", "debt", "liability", "asset",
    "equity", "interest", "payment", "installment", "limit", "exposure",
];

const EDUCATION_KEYWORDS: &[&str] = &[
    "grade", "score", "marks", "result", "pass", "fail", "rank", "performance", "gpa", "cgpa",
    "outcome", "completion", "dropout", "evaluation", "assessment",
];

/// The full ontology. A word listed under several categories appears once per category.
pub static TARGET_KEYWORDS: &[(KeywordCategory, &[&str])] = &[
    (KeywordCategory::Generic, GENERIC_KEYWORDS),
    (KeywordCategory::Events, EVENT_KEYWORDS),
    (KeywordCategory::Business, BUSINESS_KEYWORDS),
    (KeywordCategory::Medical, MEDICAL_KEYWORDS),
    (KeywordCategory::Finance, FINANCE_KEYWORDS),
    (KeywordCategory::Education, EDUCATION_KEYWORDS),
];

/// Keywords of a single ontology category
pub fn keywords(category: KeywordCategory) -> &'static [&'static str] {
    match category {
        KeywordCategory::Generic => GENERIC_KEYWORDS,
        KeywordCategory::Events => EVENT_KEYWORDS,
        KeywordCategory::Business => BUSINESS_KEYWORDS,
        KeywordCategory::Medical => MEDICAL_KEYWORDS,
        KeywordCategory::Finance => FINANCE_KEYWORDS,
        KeywordCategory::Education => EDUCATION_KEYWORDS,
    }
}

/// Coarse subject-matter domain of a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Medical,
    Business,
    Finance,
    Education,
    #[default]
    Generic,
}

impl Domain {
    /// Ontology bucket used for the domain bonus
    pub fn keyword_category(&self) -> KeywordCategory {
        match self {
            Domain::Medical => KeywordCategory::Medical,
            Domain::Business => KeywordCategory::Business,
            Domain::Finance => KeywordCategory::Finance,
            Domain::Education => KeywordCategory::Education,
            Domain::Generic => KeywordCategory::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Medical => "medical",
            Domain::Business => "business",
            Domain::Finance => "finance",
            Domain::Education => "education",
            Domain::Generic => "generic",
        }
    }
}

/// Domain markers in priority order; the first domain with a hit wins
static DOMAIN_MARKERS: &[(Domain, &[&str])] = &[
    (Domain::Medical, &["creatinine", "platelets", "serum", "blood"]),
    (Domain::Business, &["price", "revenue", "sales", "profit"]),
    (Domain::Finance, &["loan", "credit", "default", "balance"]),
    (Domain::Education, &["grade", "marks", "gpa"]),
];

/// Guess the domain of a dataset from its column names
pub fn infer_domain<S: AsRef<str>>(columns: &[S]) -> Domain {
    let text = columns
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    DOMAIN_MARKERS
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| text.contains(m)))
        .map(|(domain, _)| *domain)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medical_wins_over_business() {
        let cols = ["serum_creatinine", "price", "age"];
        assert_eq!(infer_domain(&cols), Domain::Medical);
    }

    #[test]
    fn test_each_domain() {
        assert_eq!(infer_domain(&["Revenue", "region"]), Domain::Business);
        assert_eq!(infer_domain(&["loan_amount", "age"]), Domain::Finance);
        assert_eq!(infer_domain(&["student", "GPA"]), Domain::Education);
        assert_eq!(infer_domain(&["a", "b"]), Domain::Generic);
    }

    #[test]
    fn test_markers_do_not_span_column_boundaries() {
        assert_eq!(infer_domain(&["pri", "ce"]), Domain::Generic);
    }

    #[test]
    fn test_empty_columns_is_generic() {
        let cols: [&str; 0] = [];
        assert_eq!(infer_domain(&cols), Domain::Generic);
    }

    #[test]
    fn test_every_category_has_fifteen_words() {
        for (category, words) in TARGET_KEYWORDS {
            assert_eq!(words.len(), 15, "{:?}", category);
            assert_eq!(keywords(*category), *words);
        }
    }
}
