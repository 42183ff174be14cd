//! Cartesian expansion of variable bindings into column combinations.

use super::models::{Combination, VariableBinding};

/// Outcome of expanding the bindings of one rule on one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Every combination, first variable varying slowest
    Combinations(Vec<Combination>),
    /// No binding, or some binding selected no column
    Empty,
    /// More combinations than the guard allows; nothing is produced
    TooMany { count: usize, limit: usize },
}

/// Product of the binding sizes, saturating on overflow.
pub fn combination_count(bindings: &[VariableBinding]) -> usize {
    if bindings.is_empty() {
        return 0;
    }
    bindings
        .iter()
        .fold(1usize, |acc, b| acc.saturating_mul(b.columns.len()))
}

/// Expands bindings into combinations, refusing to exceed `max_combinations`.
pub fn expand(bindings: &[VariableBinding], max_combinations: usize) -> Expansion {
    let count = combination_count(bindings);
    if count == 0 {
        return Expansion::Empty;
    }
    if count > max_combinations {
        return Expansion::TooMany {
            count,
            limit: max_combinations,
        };
    }

    let mut combinations = Vec::with_capacity(count);
    let mut indices = vec![0usize; bindings.len()];

    loop {
        combinations.push(Combination {
            assignments: bindings
                .iter()
                .zip(&indices)
                .map(|(b, &i)| (b.variable.clone(), b.columns[i].clone()))
                .collect(),
        });

        // Advance the rightmost index that still has room.
        let mut position = bindings.len();
        loop {
            if position == 0 {
                return Expansion::Combinations(combinations);
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < bindings[position].columns.len() {
                break;
            }
            indices[position] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(variable: &str, columns: &[&str]) -> VariableBinding {
        VariableBinding {
            variable: variable.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    fn pairs(expansion: &Expansion) -> Vec<Vec<&str>> {
        match expansion {
            Expansion::Combinations(all) => all.iter().map(|c| c.columns().collect()).collect(),
            other => panic!("unexpected expansion {other:?}"),
        }
    }

    #[test]
    fn test_expand_order() {
        let bindings = [binding("a", &["x", "y"]), binding("b", &["1", "2", "3"])];
        let expansion = expand(&bindings, 16);
        assert_eq!(
            pairs(&expansion),
            vec![
                vec!["x", "1"],
                vec!["x", "2"],
                vec!["x", "3"],
                vec!["y", "1"],
                vec!["y", "2"],
                vec!["y", "3"],
            ]
        );
    }

    #[test]
    fn test_expand_empty_cases() {
        assert_eq!(expand(&[], 16), Expansion::Empty);
        assert_eq!(
            expand(&[binding("a", &["x"]), binding("b", &[])], 16),
            Expansion::Empty
        );
    }

    #[test]
    fn test_guard_boundary() {
        let four: Vec<&str> = vec!["c1", "c2", "c3", "c4"];
        let sixteen = [binding("a", &four), binding("b", &four)];
        assert!(matches!(expand(&sixteen, 16), Expansion::Combinations(ref c) if c.len() == 16));

        let five: Vec<&str> = vec!["c1", "c2", "c3", "c4", "c5"];
        let twenty_five = [binding("a", &five), binding("b", &five)];
        assert_eq!(
            expand(&twenty_five, 16),
            Expansion::TooMany {
                count: 25,
                limit: 16
            }
        );
    }

    #[test]
    fn test_combination_count_saturates() {
        let wide: Vec<String> = (0..1 << 16).map(|i| i.to_string()).collect();
        let big = VariableBinding {
            variable: "v".to_string(),
            columns: wide,
        };
        let bindings = vec![big.clone(), big.clone(), big.clone(), big.clone(), big];
        assert_eq!(combination_count(&bindings), usize::MAX);
    }
}
