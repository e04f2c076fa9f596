//! Function Signatures
//!
//! Declared parameter lists and their resolution into the ordered name list
//! and default set the checker binds against. Signatures can be built
//! directly or parsed from their printed form, e.g.
//! `(bar, baz: int = 5, faz=(1, 2)) -> str`.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::error::ResolutionError;
use crate::runtime::{Function, Value};

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern");
}

/// A single declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// An ordered, duplicate-free parameter list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Result<Self, ResolutionError> {
        let mut seen = HashSet::new();
        for param in &params {
            if !IDENTIFIER.is_match(&param.name) {
                return Err(ResolutionError::InvalidName {
                    name: param.name.clone(),
                });
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ResolutionError::DuplicateParameter {
                    name: param.name.clone(),
                });
            }
        }
        Ok(Self { params })
    }

    /// Parse a printed signature. Annotations and default literals are
    /// stripped from the names; bare `*` and `/` markers are skipped.
    pub fn parse(text: &str) -> Result<Self, ResolutionError> {
        let malformed = || ResolutionError::Malformed {
            text: text.to_string(),
        };

        let rest = text.trim().strip_prefix('(').ok_or_else(malformed)?;
        let close = top_level_positions(rest, ')')
            .and_then(|positions| positions.first().copied())
            .ok_or_else(malformed)?;
        let tail = rest[close + 1..].trim();
        if !(tail.is_empty() || tail.starts_with("->")) {
            return Err(malformed());
        }

        let pieces = split_top_level(&rest[..close], ',').ok_or_else(malformed)?;
        let last = pieces.len() - 1;
        let mut params = Vec::new();
        for (idx, piece) in pieces.into_iter().enumerate() {
            let piece = piece.trim();
            match piece {
                // `()` and a trailing comma both leave an empty last piece
                "" if idx == last => continue,
                "" => return Err(malformed()),
                "*" | "/" => continue,
                p if p.starts_with('*') => {
                    return Err(ResolutionError::Variadic { text: p.to_string() });
                }
                p => params.push(parse_param(p)?),
            }
        }
        Self::new(params)
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    pub fn names_with_defaults(&self) -> HashSet<String> {
        self.params
            .iter()
            .filter(|p| p.has_default())
            .map(|p| p.name.clone())
            .collect()
    }
}

/// Parameter names in declaration order plus the subset that has defaults.
/// Resolved once per decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    names: Vec<String>,
    with_defaults: HashSet<String>,
}

impl ResolvedParams {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_default(&self, name: &str) -> bool {
        self.with_defaults.contains(name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<&Signature> for ResolvedParams {
    fn from(signature: &Signature) -> Self {
        Self {
            names: signature.names(),
            with_defaults: signature.names_with_defaults(),
        }
    }
}

pub fn resolve_parameters(function: &Function) -> Result<ResolvedParams, ResolutionError> {
    function
        .signature()
        .map(ResolvedParams::from)
        .ok_or_else(|| ResolutionError::NoSignature {
            function: function.name().to_string(),
        })
}

fn parse_param(piece: &str) -> Result<Param, ResolutionError> {
    let (declared, default) = match split_once_top_level(piece, '=') {
        Some((lhs, rhs)) => (lhs, Some(rhs.trim())),
        None => (piece, None),
    };
    let name = split_once_top_level(declared, ':')
        .map_or(declared, |(lhs, _)| lhs)
        .trim();
    if !IDENTIFIER.is_match(name) {
        return Err(ResolutionError::InvalidName { name: name.to_string() });
    }

    match default {
        None => Ok(Param::required(name)),
        Some(text) => parse_literal(text)
            .map(|value| Param::optional(name, value))
            .ok_or_else(|| ResolutionError::UnsupportedDefault {
                name: name.to_string(),
                text: text.to_string(),
            }),
    }
}

/// Evaluate a default-value literal: `None`, booleans, numbers, quoted
/// strings, tuples and lists of literals, and the empty dict.
fn parse_literal(text: &str) -> Option<Value> {
    let text = text.trim();
    match text {
        "None" => return Some(Value::None),
        "True" => return Some(Value::Bool(true)),
        "False" => return Some(Value::Bool(false)),
        "{}" => return Some(Value::Dict(Vec::new())),
        _ => {}
    }

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let pieces = split_top_level(inner, ',')?;
        // `(x)` is a parenthesised expression, not a tuple
        if pieces.len() == 1 && !pieces[0].trim().is_empty() {
            return parse_literal(pieces[0]);
        }
        return parse_items(pieces).map(Value::Tuple);
    }
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return parse_items(split_top_level(inner, ',')?).map(Value::List);
    }
    if let Some(quote) = text.chars().next().filter(|c| *c == '\'' || *c == '"') {
        let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
        return Some(Value::Str(unescape(inner)));
    }

    if !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::Int(i));
    }
    text.parse::<f64>().ok().map(Value::Float)
}

fn parse_items(pieces: Vec<&str>) -> Option<Vec<Value>> {
    let last = pieces.len().saturating_sub(1);
    let mut items = Vec::new();
    for (idx, piece) in pieces.into_iter().enumerate() {
        if piece.trim().is_empty() {
            if idx == last {
                continue;
            }
            return None;
        }
        items.push(parse_literal(piece)?);
    }
    Some(items)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

/// Byte offsets of `separator` outside brackets and string literals.
/// `None` if brackets or quotes are unbalanced.
fn top_level_positions(text: &str, separator: char) -> Option<Vec<usize>> {
    let mut positions = Vec::new();
    let mut closers: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == separator && closers.is_empty() {
            positions.push(idx);
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => closers.push(')'),
            '[' => closers.push(']'),
            '{' => closers.push('}'),
            ')' | ']' | '}' => {
                if closers.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    if quote.is_some() || !closers.is_empty() {
        return None;
    }
    Some(positions)
}

fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for idx in top_level_positions(text, separator)? {
        pieces.push(&text[start..idx]);
        start = idx + separator.len_utf8();
    }
    pieces.push(&text[start..]);
    Some(pieces)
}

fn split_once_top_level(text: &str, separator: char) -> Option<(&str, &str)> {
    let idx = *top_level_positions(text, separator)?.first()?;
    Some((&text[..idx], &text[idx + separator.len_utf8()..]))
}
