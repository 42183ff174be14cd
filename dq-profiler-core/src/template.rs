//! Placeholder substitution for SQL templates.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.
//! Every placeholder must have a value, otherwise rendering fails.

use crate::Result;
use crate::error::DqProfilerError;
use std::collections::BTreeMap;

/// Renders `template`, replacing each `{name}` with `values[name]`.
///
/// # Errors
/// Returns a `Template` error for unknown placeholders, unbalanced braces,
/// or empty placeholder names.
///
/// # Example
/// ```rust
/// use std::collections::BTreeMap;
/// use dq_profiler_core::template::render;
///
/// let mut values = BTreeMap::new();
/// values.insert("tabela".to_string(), "main.\"t\"".to_string());
/// let sql = render("select count(1) from {tabela} where x = '{{}}'", &values).unwrap();
/// assert_eq!(sql, "select count(1) from main.\"t\" where x = '{}'");
/// ```
pub fn render(template: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, nc) in chars.by_ref() {
                    if nc == '}' {
                        closed = true;
                        break;
                    }
                    if nc == '{' {
                        break;
                    }
                    name.push(nc);
                }

                if !closed {
                    return Err(DqProfilerError::template(format!(
                        "unclosed placeholder starting at byte {}",
                        pos
                    )));
                }
                if name.is_empty() {
                    return Err(DqProfilerError::template(format!(
                        "empty placeholder at byte {}",
                        pos
                    )));
                }

                let value = values.get(&name).ok_or_else(|| {
                    DqProfilerError::template(format!("no value for placeholder '{{{}}}'", name))
                })?;
                out.push_str(value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(DqProfilerError::template(format!(
                        "single '}}' encountered at byte {}",
                        pos
                    )));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
