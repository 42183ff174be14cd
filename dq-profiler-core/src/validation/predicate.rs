//! Column predicate language used by `filtro` directives.
//!
//! Predicates are boolean expressions over the fields of one profiled column:
//!
//! ```text
//! semantic_type == 'STRING' and column_name.str.startswith('NM_')
//! tipo in ['NUMERIC', 'FLOAT'] & ~(unique_ratio < 0.5)
//! ```
//!
//! Descriptor fields (`database`, `schema`, `table`, `table_type`,
//! `column_name`, `ordinal`, `native_type`, `semantic_type`) are available
//! under their alternative names too (`database_name`, `schema_name`,
//! `table_name`, `column_id`, `data_type`, `tipo`). Any other identifier is
//! looked up among the column's analyzer outputs.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::Result;
use crate::error::DqProfilerError;
use crate::models::ColumnProfile;

/// Runtime value of a predicate sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null | JsonValue::Object(_) => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => n.as_f64().map_or(Value::Null, Value::Num),
            JsonValue::String(s) => Value::Str(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }

    fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a.partial_cmp(b) == Some(Ordering::Equal),
            (Value::Null, _) | (_, Value::Null) => false,
            (a, b) => a == b,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Minus,
    Amp,
    Pipe,
    Tilde,
    Cmp(CmpOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrMethod {
    Contains,
    StartsWith,
    EndsWith,
    Match,
    Lower,
    Upper,
}

impl StrMethod {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "contains" => Some(Self::Contains),
            "startswith" => Some(Self::StartsWith),
            "endswith" => Some(Self::EndsWith),
            "match" => Some(Self::Match),
            "lower" => Some(Self::Lower),
            "upper" => Some(Self::Upper),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Lower | Self::Upper => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Field(String),
    List(Vec<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    In {
        negated: bool,
        item: Box<Expr>,
        list: Box<Expr>,
    },
    Str {
        method: StrMethod,
        target: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// A parsed column predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    source: String,
    expr: Expr,
}

impl Predicate {
    /// Parses a predicate expression.
    ///
    /// # Errors
    /// Returns a `Predicate` error on syntax errors.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source).map_err(|m| DqProfilerError::predicate(source, m))?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser
            .parse_expression()
            .map_err(|m| DqProfilerError::predicate(source, m))?;
        if let Some(token) = parser.peek() {
            return Err(DqProfilerError::predicate(
                source,
                format!("unexpected token {token:?}"),
            ));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the predicate for one column. A null result counts as
    /// `false`.
    ///
    /// # Errors
    /// Returns a `Predicate` error for unknown fields, type mismatches, bad
    /// regular expressions, or a non-boolean result.
    pub fn evaluate(&self, column: &ColumnProfile) -> Result<bool> {
        let value =
            eval(&self.expr, column).map_err(|m| DqProfilerError::predicate(&self.source, m))?;
        truth(&value).map_err(|m| DqProfilerError::predicate(&self.source, m))
    }
}

type EvalResult<T> = std::result::Result<T, String>;

fn tokenize(source: &str) -> EvalResult<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => push(&mut tokens, &mut i, Token::LParen, 1),
            ')' => push(&mut tokens, &mut i, Token::RParen, 1),
            '[' => push(&mut tokens, &mut i, Token::LBracket, 1),
            ']' => push(&mut tokens, &mut i, Token::RBracket, 1),
            ',' => push(&mut tokens, &mut i, Token::Comma, 1),
            '-' => push(&mut tokens, &mut i, Token::Minus, 1),
            '&' => push(&mut tokens, &mut i, Token::Amp, 1),
            '|' => push(&mut tokens, &mut i, Token::Pipe, 1),
            '~' => push(&mut tokens, &mut i, Token::Tilde, 1),
            '=' | '!' | '<' | '>' => {
                let next_is_eq = chars.get(i + 1) == Some(&'=');
                let (op, width) = match (c, next_is_eq) {
                    ('=', true) => (CmpOp::Eq, 2),
                    ('!', true) => (CmpOp::Ne, 2),
                    ('<', true) => (CmpOp::Le, 2),
                    ('>', true) => (CmpOp::Ge, 2),
                    ('<', false) => (CmpOp::Lt, 1),
                    ('>', false) => (CmpOp::Gt, 1),
                    _ => return Err(format!("unexpected character '{c}' at {i}")),
                };
                push(&mut tokens, &mut i, Token::Cmp(op), width);
            }
            '\'' | '"' => {
                let (text, end) = read_string(&chars, i)?;
                tokens.push(Token::Str(text));
                i = end;
            }
            '.' if !chars.get(i + 1).is_some_and(char::is_ascii_digit) => {
                push(&mut tokens, &mut i, Token::Dot, 1);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_digit()
                        || chars[i] == '.'
                        || matches!(chars[i], 'e' | 'E')
                        || (matches!(chars[i], '+' | '-') && matches!(chars[i - 1], 'e' | 'E')))
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{text}'"))?;
                tokens.push(Token::Num(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{other}' at {i}")),
        }
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<Token>, pos: &mut usize, token: Token, width: usize) {
    tokens.push(token);
    *pos += width;
}

fn read_string(chars: &[char], start: usize) -> EvalResult<(String, usize)> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                text.push(chars[i + 1]);
                i += 2;
            }
            c if c == quote => return Ok((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(format!("unterminated string starting at {start}"))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(word)) if word == keyword)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> EvalResult<()> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(format!("expected {expected:?}, found {token:?}")),
            None => Err(format!("expected {expected:?}, found end of input")),
        }
    }

    fn parse_expression(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Pipe)) || self.peek_keyword("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), Some(Token::Amp)) || self.peek_keyword("and") {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> EvalResult<Expr> {
        if matches!(self.peek(), Some(Token::Tilde)) || self.peek_keyword("not") {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> EvalResult<Expr> {
        let left = self.parse_operand()?;

        if let Some(Token::Cmp(op)) = self.peek() {
            let op = *op;
            self.advance();
            let right = self.parse_operand()?;
            return Ok(Expr::Compare(op, Box::new(left), Box::new(right)));
        }

        let negated = if self.peek_keyword("in") {
            false
        } else if self.peek_keyword("not")
            && matches!(self.tokens.get(self.pos + 1), Some(Token::Ident(w)) if w == "in")
        {
            self.advance();
            true
        } else {
            return Ok(left);
        };
        self.advance();
        let list = self.parse_operand()?;
        Ok(Expr::In {
            negated,
            item: Box::new(left),
            list: Box::new(list),
        })
    }

    fn parse_operand(&mut self) -> EvalResult<Expr> {
        let mut expr = self.parse_primary()?;

        while matches!(self.peek(), Some(Token::Dot)) {
            self.advance();
            match self.advance() {
                Some(Token::Ident(accessor)) if accessor == "str" => {}
                other => return Err(format!("expected '.str' accessor, found {other:?}")),
            }
            self.expect(&Token::Dot)?;
            let method = match self.advance() {
                Some(Token::Ident(name)) => StrMethod::from_name(&name)
                    .ok_or_else(|| format!("unsupported string method '{name}'"))?,
                other => return Err(format!("expected string method, found {other:?}")),
            };
            let args = self.parse_arguments()?;
            if args.len() != method.arity() {
                return Err(format!(
                    "{method:?} takes {} argument(s), got {}",
                    method.arity(),
                    args.len()
                ));
            }
            expr = Expr::Str {
                method,
                target: Box::new(expr),
                args,
            };
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> EvalResult<Vec<Expr>> {
        self.expect(&Token::LParen)?;
        let args = self.parse_sequence(&Token::RParen)?;
        Ok(args)
    }

    fn parse_sequence(&mut self, close: &Token) -> EvalResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.peek() == Some(close) {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            match self.advance() {
                Some(Token::Comma) if self.peek() == Some(close) => {
                    self.advance();
                    return Ok(items);
                }
                Some(Token::Comma) => {}
                Some(ref token) if token == close => return Ok(items),
                other => return Err(format!("expected ',' or {close:?}, found {other:?}")),
            }
        }
    }

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::Num(n)) => Ok(Expr::Literal(Value::Num(n))),
            Some(Token::Minus) => Ok(Expr::Neg(Box::new(self.parse_primary()?))),
            Some(Token::LParen) => {
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => Ok(Expr::List(self.parse_sequence(&Token::RBracket)?)),
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "True" | "true" => Expr::Literal(Value::Bool(true)),
                "False" | "false" => Expr::Literal(Value::Bool(false)),
                "None" | "null" => Expr::Literal(Value::Null),
                _ => Expr::Field(name),
            }),
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of input".to_string()),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn field_value(column: &ColumnProfile, name: &str) -> Option<Value> {
    let descriptor = &column.column;
    let count = |n: Option<u64>| n.map_or(Value::Null, |n| Value::Num(n as f64));

    let value = match name {
        "database" | "database_name" => Value::Str(descriptor.database.clone()),
        "schema" | "schema_name" => Value::Str(descriptor.schema.clone()),
        "table" | "table_name" => Value::Str(descriptor.table.clone()),
        "table_type" => Value::Str(descriptor.table_type.clone()),
        "column_name" => Value::Str(descriptor.column_name.clone()),
        "ordinal" | "column_id" | "cid" => Value::Num(f64::from(descriptor.ordinal)),
        "native_type" | "data_type" => Value::Str(descriptor.native_type.clone()),
        "semantic_type" | "tipo" => descriptor
            .semantic_type
            .map_or(Value::Null, |t| Value::Str(t.as_str().to_string())),
        "row_count" => count(column.row_count),
        "sample_size_actual" => count(column.sample_size_actual.map(|n| n as u64)),
        "distinct_sample_rows" => count(column.distinct_sample_rows.map(|n| n as u64)),
        "applied_filter" => column
            .applied_filter
            .as_ref()
            .map_or(Value::Null, |f| Value::Str(f.clone())),
        _ => return column.metric(name).map(Value::from_json),
    };
    Some(value)
}

fn truth(value: &Value) -> EvalResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(format!("expected a boolean, got {}", other.type_name())),
    }
}

fn eval(expr: &Expr, column: &ColumnProfile) -> EvalResult<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(name) => {
            field_value(column, name).ok_or_else(|| format!("unknown field '{name}'"))
        }
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, column))
            .collect::<EvalResult<Vec<_>>>()
            .map(Value::List),
        Expr::Neg(inner) => match eval(inner, column)? {
            Value::Num(n) => Ok(Value::Num(-n)),
            other => Err(format!("cannot negate a {}", other.type_name())),
        },
        Expr::Not(inner) => Ok(Value::Bool(!truth(&eval(inner, column)?)?)),
        Expr::And(left, right) => {
            if !truth(&eval(left, column)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truth(&eval(right, column)?)?))
        }
        Expr::Or(left, right) => {
            if truth(&eval(left, column)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truth(&eval(right, column)?)?))
        }
        Expr::Compare(op, left, right) => {
            let left = eval(left, column)?;
            let right = eval(right, column)?;
            compare(*op, &left, &right).map(Value::Bool)
        }
        Expr::In {
            negated,
            item,
            list,
        } => {
            let item = eval(item, column)?;
            let Value::List(items) = eval(list, column)? else {
                return Err("right side of 'in' must be a list".to_string());
            };
            let found = items.iter().any(|candidate| item.loose_eq(candidate));
            Ok(Value::Bool(found != *negated))
        }
        Expr::Str {
            method,
            target,
            args,
        } => {
            let target = match eval(target, column)? {
                Value::Str(s) => s,
                Value::Null => return Ok(Value::Null),
                other => return Err(format!(".str used on a {}", other.type_name())),
            };
            let argument = match args.first() {
                Some(arg) => match eval(arg, column)? {
                    Value::Str(s) => Some(s),
                    other => {
                        return Err(format!(
                            "string method argument must be a string, got {}",
                            other.type_name()
                        ));
                    }
                },
                None => None,
            };
            apply_str_method(*method, &target, argument.as_deref().unwrap_or_default())
        }
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
    match op {
        CmpOp::Eq => return Ok(left.loose_eq(right)),
        CmpOp::Ne => return Ok(!left.loose_eq(right)),
        _ => {}
    }

    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(false),
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (a, b) => {
            return Err(format!(
                "cannot order {} against {}",
                a.type_name(),
                b.type_name()
            ));
        }
    };

    Ok(match ordering {
        Some(ordering) => match op {
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Eq | CmpOp::Ne => false,
        },
        None => false,
    })
}

fn apply_str_method(method: StrMethod, target: &str, argument: &str) -> EvalResult<Value> {
    let regex = |pattern: &str| Regex::new(pattern).map_err(|e| format!("invalid regex: {e}"));

    Ok(match method {
        StrMethod::Contains => Value::Bool(regex(argument)?.is_match(target)),
        StrMethod::Match => Value::Bool(regex(&format!("^(?:{argument})"))?.is_match(target)),
        StrMethod::StartsWith => Value::Bool(target.starts_with(argument)),
        StrMethod::EndsWith => Value::Bool(target.ends_with(argument)),
        StrMethod::Lower => Value::Str(target.to_lowercase()),
        StrMethod::Upper => Value::Str(target.to_uppercase()),
    })
}
