//! Brazilian national identifiers: CPF (11 digits) and CNPJ (14 digits).
//!
//! Punctuation is ignored. A number made of one repeated digit is invalid
//! even when its check digits add up.

use serde_json::Value as JsonValue;

use super::{ratio, value_text};
use crate::models::SemanticType;

/// Output fields.
pub const OUTPUTS: &[&str] = &["cpf_cnpj_valid_ratio", "cpf_valid_ratio", "cnpj_valid_ratio"];

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Keeps only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

fn to_digits(digits: &str) -> Option<Vec<u32>> {
    digits.chars().map(|c| c.to_digit(10)).collect()
}

fn is_repeated(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// Validates an 11-digit CPF number.
pub fn is_valid_cpf(digits: &str) -> bool {
    let Some(d) = to_digits(digits) else {
        return false;
    };
    if d.len() != 11 || is_repeated(&d) {
        return false;
    }

    let first_weights: Vec<u32> = (2..=10).rev().collect();
    let second_weights: Vec<u32> = (2..=11).rev().collect();
    check_digit(&d[..9], &first_weights) == d[9] && check_digit(&d[..10], &second_weights) == d[10]
}

/// Validates a 14-digit CNPJ number.
pub fn is_valid_cnpj(digits: &str) -> bool {
    let Some(d) = to_digits(digits) else {
        return false;
    };
    if d.len() != 14 || is_repeated(&d) {
        return false;
    }

    check_digit(&d[..12], &CNPJ_FIRST_WEIGHTS) == d[12]
        && check_digit(&d[..13], &CNPJ_SECOND_WEIGHTS) == d[13]
}

/// Validates a CPF or CNPJ, punctuation allowed.
pub fn is_valid_cpf_or_cnpj(raw: &str) -> bool {
    let digits = digits_only(raw);
    match digits.len() {
        11 => is_valid_cpf(&digits),
        14 => is_valid_cnpj(&digits),
        _ => false,
    }
}

/// Valid identifier ratios over the non-null values of a STRING column.
pub fn analyze(
    _column: &str,
    semantic_type: Option<SemanticType>,
    values: &[JsonValue],
) -> Option<Vec<JsonValue>> {
    if semantic_type != Some(SemanticType::String) {
        return None;
    }

    let present = values.iter().filter(|v| !v.is_null()).count();
    if present == 0 {
        return None;
    }

    let mut valid = 0;
    let mut valid_cpf = 0;
    let mut valid_cnpj = 0;
    for text in values.iter().filter_map(value_text) {
        if !is_valid_cpf_or_cnpj(&text) {
            continue;
        }
        valid += 1;
        match digits_only(&text).len() {
            11 => valid_cpf += 1,
            14 => valid_cnpj += 1,
            _ => {}
        }
    }

    Some(vec![
        ratio(valid, present),
        ratio(valid_cpf, present),
        ratio(valid_cnpj, present),
    ])
}
