//! Personal name detection against common Brazilian given names and surnames.

use serde_json::Value as JsonValue;
use unicode_normalization::UnicodeNormalization;

use super::ratio;
use crate::models::SemanticType;

/// Output fields.
pub const OUTPUTS: &[&str] = &["name_ratio"];

// Most frequent names in the 2010 IBGE census.
const COMMON_MALE_GIVEN_NAMES: &[&str] = &[
    "jose", "joao", "antonio", "francisco", "carlos", "paulo", "pedro", "lucas", "luiz", "marcos",
    "luis", "gabriel", "rafael", "daniel", "marcelo", "bruno", "eduardo", "felipe", "raimundo",
    "rodrigo",
];

const COMMON_FEMALE_GIVEN_NAMES: &[&str] = &[
    "maria", "ana", "francisca", "antonia", "adriana", "juliana", "marcia", "fernanda", "patricia",
    "aline", "sandra", "camila", "amanda", "bruna", "jessica", "leticia", "julia", "luciana",
    "vanessa", "mariana",
];

const COMMON_SURNAMES: &[&str] = &[
    "silva", "santos", "oliveira", "souza", "sousa", "lima", "costa", "pereira", "rodrigues",
    "almeida", "ferreira", "araujo", "carvalho", "gomes", "martins", "barbosa", "alves", "melo",
    "ribeiro", "moura", "cavalcante", "castro", "cardoso", "fernandes", "torres", "mendes",
    "barros", "freitas", "nunes", "peixoto", "junior",
];

/// NFKD-decomposes, drops what is left outside ASCII, and lower-cases.
pub fn fold(text: &str) -> String {
    text.nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_ascii_lowercase()
}

fn is_common_name(token: &str) -> bool {
    COMMON_MALE_GIVEN_NAMES.contains(&token)
        || COMMON_FEMALE_GIVEN_NAMES.contains(&token)
        || COMMON_SURNAMES.contains(&token)
}

/// Whether any whitespace-separated token of `text` is a common name.
pub fn contains_common_name(text: &str) -> bool {
    fold(text).split_whitespace().any(is_common_name)
}

/// Fraction of all sampled values (nulls included) of a STRING column that
/// contain a common name.
pub fn analyze(
    _column: &str,
    semantic_type: Option<SemanticType>,
    values: &[JsonValue],
) -> Option<Vec<JsonValue>> {
    if semantic_type != Some(SemanticType::String) || values.is_empty() {
        return None;
    }

    let matches = values
        .iter()
        .filter(|v| v.as_str().is_some_and(contains_common_name))
        .count();

    Some(vec![ratio(matches, values.len())])
}
