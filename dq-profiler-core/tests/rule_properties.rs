//! Property tests for combination expansion, template rendering, and the
//! order-statistics analyzers.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashSet};

use dq_profiler_core::profiling::analyzers::{percentiles, uniqueness};
use dq_profiler_core::template::render;
use dq_profiler_core::validation::{Expansion, VariableBinding, combination_count, expand};
use proptest::prelude::*;
use serde_json::{Value as JsonValue, json};

fn bindings_strategy() -> impl Strategy<Value = Vec<VariableBinding>> {
    prop::collection::vec(1usize..6, 1..4).prop_map(|sizes| {
        sizes
            .into_iter()
            .enumerate()
            .map(|(v, size)| VariableBinding {
                variable: format!("v{v}"),
                columns: (0..size).map(|c| format!("c{c}")).collect(),
            })
            .collect()
    })
}

fn to_json(values: Vec<Option<i64>>) -> Vec<JsonValue> {
    values
        .into_iter()
        .map(|v| v.map_or(JsonValue::Null, |n| json!(n)))
        .collect()
}

proptest! {
    #[test]
    fn expansion_respects_guard(bindings in bindings_strategy(), limit in 1usize..40) {
        let count = combination_count(&bindings);
        let product: usize = bindings.iter().map(|b| b.columns.len()).product();
        prop_assert_eq!(count, product);

        match expand(&bindings, limit) {
            Expansion::Combinations(all) => {
                prop_assert!(count <= limit);
                prop_assert_eq!(all.len(), count);
                let distinct: HashSet<_> = all.iter().cloned().collect();
                prop_assert_eq!(distinct.len(), count);
                for combination in &all {
                    prop_assert_eq!(combination.len(), bindings.len());
                }
            }
            Expansion::TooMany { count: reported, limit: reported_limit } => {
                prop_assert!(count > limit);
                prop_assert_eq!(reported, count);
                prop_assert_eq!(reported_limit, limit);
            }
            Expansion::Empty => prop_assert!(false, "non-empty bindings expanded to nothing"),
        }
    }

    #[test]
    fn render_without_placeholders_is_identity(text in "[a-zA-Z0-9 ,.()*=<>'_\n]*") {
        let rendered = render(&text, &BTreeMap::new()).unwrap();
        prop_assert_eq!(rendered, text);
    }

    #[test]
    fn render_substitutes_every_occurrence(
        column in "[A-Za-z_][A-Za-z0-9_]{0,12}",
        repeats in 1usize..5,
    ) {
        let template = vec!["{col}"; repeats].join(" + ");
        let mut values = BTreeMap::new();
        values.insert("col".to_string(), column.clone());
        let rendered = render(&template, &values).unwrap();
        prop_assert_eq!(rendered, vec![column.as_str(); repeats].join(" + "));
    }

    #[test]
    fn percentiles_are_ordered(
        values in prop::collection::vec(prop::option::of(-1000i64..1000), 1..200),
    ) {
        let values = to_json(values);
        match percentiles::analyze("c", None, &values) {
            Some(out) => {
                prop_assert_eq!(out.len(), percentiles::OUTPUTS.len());
                let numbers: Vec<i64> = out.iter().filter_map(JsonValue::as_i64).collect();
                prop_assert_eq!(numbers.len(), out.len());
                prop_assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
            }
            None => prop_assert!(values.iter().all(JsonValue::is_null)),
        }
    }

    #[test]
    fn uniqueness_ratios_are_bounded(
        values in prop::collection::vec(prop::option::of(0i64..20), 1..100),
    ) {
        let values = to_json(values);
        let out = uniqueness::analyze("c", None, &values).unwrap();
        let missing = out[0].as_f64().unwrap();
        let unique = out[1].as_f64().unwrap();
        prop_assert!((0.0..=1.0).contains(&missing));
        prop_assert!((0.0..=1.0).contains(&unique));
        prop_assert!(missing + unique <= 1.0 + 1e-9);
    }
}
