//! Tests for target resolution

mod common;

use common::*;
use dataiq::pipeline::target::{Exclusion, ACCEPTANCE_THRESHOLD, FUZZY_CUTOFF};
use dataiq::pipeline::{
    association_strategy, profile_and_resolve_target, suggest_target_columns, Dataset,
    NoAssociation, ResolutionSource, TargetResolution, TargetResolver,
};
use polars::prelude::*;

fn resolver_without_association() -> TargetResolver {
    TargetResolver::new(ACCEPTANCE_THRESHOLD, FUZZY_CUTOFF, Box::new(NoAssociation))
}

#[test]
fn test_fraud_target_detected_automatically() {
    let (_, resolution) = profile_and_resolve_target(create_fraud_dataframe(200), None).unwrap();

    assert_eq!(
        resolution,
        TargetResolution::Resolved {
            column: "is_fraud".to_string(),
            source: ResolutionSource::Auto,
        }
    );
}

#[test]
fn test_identifier_only_dataset_is_unsupervised() {
    let (_, resolution) =
        profile_and_resolve_target(create_identifier_dataframe(500), None).unwrap();

    match resolution {
        TargetResolution::Unsupervised { reason } => {
            assert_eq!(reason, "no eligible target columns");
        }
        other => panic!("expected Unsupervised, got {:?}", other),
    }
}

#[test]
fn test_identifier_columns_are_excluded_from_scoring() {
    let dataset = Dataset::from_frame(create_identifier_dataframe(500)).unwrap();
    let detection = resolver_without_association().detect(&dataset);

    assert!(detection.scores.is_empty());
    assert!(detection
        .excluded
        .contains(&("price".to_string(), Exclusion::Identifier)));
    assert!(detection
        .excluded
        .contains(&("id".to_string(), Exclusion::Identifier)));
}

#[test]
fn test_misspelled_target_needs_user_input() {
    let (_, resolution) =
        profile_and_resolve_target(create_retail_dataframe(), Some("reveune")).unwrap();

    match resolution {
        TargetResolution::NeedsUserInput {
            attempted_name,
            suggestions,
            all_columns,
        } => {
            assert_eq!(attempted_name, "reveune");
            assert_eq!(suggestions, vec!["revenue".to_string()]);
            assert_eq!(all_columns.len(), 4);
        }
        other => panic!("expected NeedsUserInput, got {:?}", other),
    }
}

#[test]
fn test_user_target_matches_case_insensitively() {
    let (_, resolution) =
        profile_and_resolve_target(create_retail_dataframe(), Some("  REVENUE ")).unwrap();

    assert_eq!(
        resolution,
        TargetResolution::Resolved {
            column: "revenue".to_string(),
            source: ResolutionSource::UserExact,
        }
    );
}

#[test]
fn test_unrelated_user_target_falls_back_to_detection() {
    let (_, resolution) =
        profile_and_resolve_target(create_mixed_dataframe(), Some("zzzzzzzz")).unwrap();

    assert_eq!(
        resolution,
        TargetResolution::Resolved {
            column: "outcome".to_string(),
            source: ResolutionSource::AutoFallback,
        }
    );
}

#[test]
fn test_misspelling_suggests_only_close_names() {
    let columns = ["revenue", "gender", "tenure", "region"];
    assert_eq!(
        suggest_target_columns("reveune", &columns, FUZZY_CUTOFF),
        vec!["revenue".to_string()]
    );
}

#[test]
fn test_dissimilar_user_target_falls_back_to_detection() {
    let n = 60;
    let df = df! {
        "income" => (0..n).map(|i| 20_000.0 + i as f64 * 750.0).collect::<Vec<_>>(),
        "gender" => (0..n).map(|i| if i % 2 == 0 { "f" } else { "m" }).collect::<Vec<_>>(),
        "survived" => (0..n).map(|i| ((i / 3) % 2) as i32).collect::<Vec<_>>(),
    }
    .unwrap();

    let columns = ["income", "gender", "survived"];
    assert!(suggest_target_columns("predicted", &columns, FUZZY_CUTOFF).is_empty());

    let (_, resolution) = profile_and_resolve_target(df, Some("predicted")).unwrap();
    assert_eq!(
        resolution,
        TargetResolution::Resolved {
            column: "survived".to_string(),
            source: ResolutionSource::AutoFallback,
        }
    );
}

#[test]
fn test_all_distinct_column_never_auto_selected() {
    for rows in [20usize, 57, 300] {
        let df = df! {
            "target" => (0..rows as i32).collect::<Vec<_>>(),
            "label" => (0..rows).map(|i| format!("row{}", i)).collect::<Vec<_>>(),
            "segment" => (0..rows).map(|i| (i % 3) as i32).collect::<Vec<_>>(),
        }
        .unwrap();
        let dataset = Dataset::from_frame(df).unwrap();
        let resolution = resolver_without_association().resolve(&dataset, None);

        assert_ne!(resolution.column(), Some("target"));
        assert_ne!(resolution.column(), Some("label"));
    }
}

#[test]
fn test_constant_column_excluded_from_scoring() {
    let dataset = Dataset::from_frame(create_mixed_dataframe()).unwrap();
    let detection = resolver_without_association().detect(&dataset);

    assert!(detection
        .excluded
        .contains(&("country".to_string(), Exclusion::Constant)));
    assert!(detection.scores.iter().all(|s| s.column != "country"));
}

#[test]
fn test_score_breakdown_adds_up() {
    let dataset = Dataset::from_frame(create_mixed_dataframe()).unwrap();
    let detection = TargetResolver::default().detect(&dataset);

    for s in &detection.scores {
        let sum = s.semantic + s.statistical + s.domain + s.association;
        assert!((s.total - sum).abs() < 1e-9, "{} does not add up", s.column);
        assert!((0.0..=5.0).contains(&s.association));
    }
    assert_eq!(detection.best().map(|b| b.column.as_str()), Some("outcome"));
}

#[test]
fn test_fuzzy_suggestions_monotonic_in_cutoff() {
    let columns = [
        "revenue", "revenues", "revenue_usd", "avenue", "venue", "price", "store_id",
    ];
    let mut previous = 0;
    for cutoff in [0.95, 0.8, 0.6, 0.4, 0.2, 0.0] {
        let suggestions = suggest_target_columns("revenue", &columns, cutoff);
        assert!(suggestions.len() <= 3);
        assert!(suggestions.len() >= previous);
        previous = suggestions.len();
    }
    assert_eq!(previous, 3);
}

#[test]
fn test_association_strategy_follows_capability() {
    let strategy = association_strategy(true);
    if cfg!(feature = "mutual-info") {
        assert_eq!(strategy.name(), "mutual_information");
    } else {
        assert_eq!(strategy.name(), "disabled");
    }
    assert_eq!(association_strategy(false).name(), "disabled");
}
