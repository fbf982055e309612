use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::constants::ROOT_PATH;
use crate::error::{Error, Result};
use crate::largetext::LargeText;
use crate::path::{self, format_path, PathArg};
use crate::temporal::{DateTime, Timestamp};
use crate::value::{format_number, json_number, Value, ValueTable};

/// Typed accessors over the flat path namespace.
///
/// Lookup failures are soft: a missing path (or an explicit JSON null)
/// yields `Ok(None)` so callers can apply their own default. A path
/// that resolves to an incompatible kind is a hard
/// [`Error::TypeMismatch`]; content that fails to convert is a hard
/// [`Error::Conversion`].
impl ValueTable {
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn exists_with(&self, path: &str, args: &[PathArg]) -> bool {
        self.exists(&format_path(path, args))
    }

    pub fn get_value(&self, path: &str) -> Option<&Value> {
        self.get(path)
    }

    pub fn get_value_with(&self, path: &str, args: &[PathArg]) -> Option<&Value> {
        self.get_value(&format_path(path, args))
    }

    pub fn get_boolean(&self, path: &str) -> Result<Option<bool>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Boolean(value)) => Ok(Some(*value)),
            Some(other) => Err(Error::type_mismatch(path, "boolean", other.kind())),
        }
    }

    pub fn get_boolean_with(&self, path: &str, args: &[PathArg]) -> Result<Option<bool>> {
        self.get_boolean(&format_path(path, args))
    }

    /// Numeric strings convert; other kinds do not.
    pub fn get_number(&self, path: &str) -> Result<Option<f64>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(value)) => Ok(Some(*value)),
            Some(Value::String(text)) => parse_numeric(path, text).map(Some),
            Some(Value::LargeText(text)) => parse_numeric(path, &text.to_string()).map(Some),
            Some(other) => Err(Error::type_mismatch(path, "number", other.kind())),
        }
    }

    pub fn get_number_with(&self, path: &str, args: &[PathArg]) -> Result<Option<f64>> {
        self.get_number(&format_path(path, args))
    }

    /// Booleans and numbers render to their textual form.
    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_text(path, value).map(Some),
        }
    }

    pub fn get_string_with(&self, path: &str, args: &[PathArg]) -> Result<Option<String>> {
        self.get_string(&format_path(path, args))
    }

    pub fn get_largetext(&self, path: &str) -> Result<Option<LargeText>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::LargeText(text)) => Ok(Some(text.clone())),
            Some(value) => scalar_text(path, value).map(|text| Some(LargeText::from(text))),
        }
    }

    pub fn get_largetext_with(&self, path: &str, args: &[PathArg]) -> Result<Option<LargeText>> {
        self.get_largetext(&format_path(path, args))
    }

    pub fn get_datetime(&self, path: &str) -> Result<Option<DateTime>> {
        match self.string_content(path, "date")? {
            None => Ok(None),
            Some(text) => DateTime::parse(&text)
                .map(Some)
                .ok_or_else(|| Error::conversion(path, format!("'{text}' is not an ISO-8601 date"))),
        }
    }

    pub fn get_datetime_with(&self, path: &str, args: &[PathArg]) -> Result<Option<DateTime>> {
        self.get_datetime(&format_path(path, args))
    }

    /// Offset-free reading; any UTC offset in the text is dropped.
    pub fn get_timestamp(&self, path: &str) -> Result<Option<Timestamp>> {
        Ok(self.get_timestamp_tz(path)?.map(|mut value| {
            value.offset_minutes = None;
            value
        }))
    }

    pub fn get_timestamp_with(&self, path: &str, args: &[PathArg]) -> Result<Option<Timestamp>> {
        self.get_timestamp(&format_path(path, args))
    }

    pub fn get_timestamp_tz(&self, path: &str) -> Result<Option<Timestamp>> {
        match self.string_content(path, "timestamp")? {
            None => Ok(None),
            Some(text) => Timestamp::parse(&text).map(Some).ok_or_else(|| {
                Error::conversion(path, format!("'{text}' is not an ISO-8601 timestamp"))
            }),
        }
    }

    pub fn get_timestamp_tz_with(&self, path: &str, args: &[PathArg]) -> Result<Option<Timestamp>> {
        self.get_timestamp_tz(&format_path(path, args))
    }

    /// Member count for objects, element count for arrays.
    pub fn get_count(&self, path: &str) -> Result<Option<usize>> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::Object(members)) => Ok(Some(members.len())),
            Some(Value::Array(count)) => Ok(Some(*count)),
            Some(other) => Err(Error::type_mismatch(path, "object or array", other.kind())),
        }
    }

    pub fn get_count_with(&self, path: &str, args: &[PathArg]) -> Result<Option<usize>> {
        self.get_count(&format_path(path, args))
    }

    pub fn get_members(&self, path: &str) -> Result<Option<Vec<SmolStr>>> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::Object(members)) => Ok(Some(members.clone())),
            Some(other) => Err(Error::type_mismatch(path, "object", other.kind())),
        }
    }

    pub fn get_members_with(&self, path: &str, args: &[PathArg]) -> Result<Option<Vec<SmolStr>>> {
        self.get_members(&format_path(path, args))
    }

    /// Element-wise [`get_string`](Self::get_string); null elements are
    /// `None`.
    pub fn get_string_array(&self, path: &str) -> Result<Option<Vec<Option<String>>>> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::Array(count)) => {
                let mut items = Vec::with_capacity(*count);
                for index in 1..=*count {
                    items.push(self.get_string(&path::join_index(path, index))?);
                }
                Ok(Some(items))
            }
            Some(other) => Err(Error::type_mismatch(path, "array", other.kind())),
        }
    }

    pub fn get_string_array_with(
        &self,
        path: &str,
        args: &[PathArg],
    ) -> Result<Option<Vec<Option<String>>>> {
        self.get_string_array(&format_path(path, args))
    }

    pub fn get_number_array(&self, path: &str) -> Result<Option<Vec<Option<f64>>>> {
        match self.get(path) {
            None => Ok(None),
            Some(Value::Array(count)) => {
                let mut items = Vec::with_capacity(*count);
                for index in 1..=*count {
                    items.push(self.get_number(&path::join_index(path, index))?);
                }
                Ok(Some(items))
            }
            Some(other) => Err(Error::type_mismatch(path, "array", other.kind())),
        }
    }

    pub fn get_number_array_with(
        &self,
        path: &str,
        args: &[PathArg],
    ) -> Result<Option<Vec<Option<f64>>>> {
        self.get_number_array(&format_path(path, args))
    }

    /// Rebuilds a `serde_json::Value` for the subtree at `path`.
    pub fn to_value(&self, path: &str) -> Option<serde_json::Value> {
        let value = self.get(path)?;
        Some(match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(flag) => serde_json::Value::Bool(*flag),
            Value::Number(num) => json_number(*num),
            Value::String(text) => serde_json::Value::String(text.clone()),
            Value::LargeText(text) => serde_json::Value::String(text.to_string()),
            Value::Object(members) => {
                let mut map = serde_json::Map::new();
                for member in members {
                    if let Some(child) = self.to_value(&path::join(path, member.as_str())) {
                        map.insert(member.to_string(), child);
                    }
                }
                serde_json::Value::Object(map)
            }
            Value::Array(count) => {
                let mut items = Vec::with_capacity(*count);
                for index in 1..=*count {
                    items.push(
                        self.to_value(&path::join_index(path, index))
                            .unwrap_or(serde_json::Value::Null),
                    );
                }
                serde_json::Value::Array(items)
            }
        })
    }

    /// Wildcard search over the flattened namespace.
    ///
    /// `return_pattern` and the optional `subpath` concatenate into one
    /// pattern that is tokenized on `%`, `.`, `[` and `]`. The walk
    /// descends, per sibling group, only into the children tied for the
    /// longest token-prefix match of their accumulated path. A node
    /// consuming the whole pattern is collected when its leaf value's
    /// string form matches the `%`-wildcard `value_pattern` (if given);
    /// the part of its path covered by `return_pattern` is returned, in
    /// document order.
    pub fn find_paths_like(
        &self,
        return_pattern: &str,
        subpath: Option<&str>,
        value_pattern: Option<&str>,
    ) -> Vec<String> {
        let mut pattern = String::from(return_pattern);
        if let Some(sub) = subpath {
            pattern.push_str(sub);
        }
        let tokens = tokenize_pattern(&pattern);
        let mut results = Vec::new();
        if tokens.is_empty() {
            return results;
        }
        let return_tokens = tokenize_pattern(return_pattern).len();
        self.search_node(ROOT_PATH, &tokens, return_tokens, value_pattern, &mut results);
        results
    }

    fn search_node(
        &self,
        node: &str,
        tokens: &[PatternToken],
        return_tokens: usize,
        value_pattern: Option<&str>,
        results: &mut Vec<String>,
    ) {
        let children: Vec<String> = match self.get(node) {
            Some(Value::Object(members)) => members
                .iter()
                .map(|member| path::join(node, member.as_str()))
                .collect(),
            Some(Value::Array(count)) => (1..=*count)
                .map(|index| path::join_index(node, index))
                .collect(),
            _ => return,
        };
        let mut scored: Vec<(String, usize)> = Vec::new();
        let mut best = 0usize;
        for child in children {
            if let Some(score) = prefix_match(tokens, &child) {
                best = best.max(score);
                scored.push((child, score));
            }
        }
        for (child, score) in scored {
            if score != best {
                continue;
            }
            if score == tokens.len() && self.leaf_matches(&child, value_pattern) {
                results.push(return_portion(tokens, return_tokens, &child));
            }
            self.search_node(&child, tokens, return_tokens, value_pattern, results);
        }
    }

    fn leaf_matches(&self, node: &str, value_pattern: Option<&str>) -> bool {
        let Some(pattern) = value_pattern else {
            return true;
        };
        let text = match self.get(node) {
            Some(Value::Boolean(true)) => "true".to_string(),
            Some(Value::Boolean(false)) => "false".to_string(),
            Some(Value::Number(num)) => format_number(*num),
            Some(Value::String(text)) => text.clone(),
            Some(Value::LargeText(text)) => text.to_string(),
            _ => return false,
        };
        like_match(pattern, &text)
    }

    fn string_content(&self, path: &str, expected: &'static str) -> Result<Option<String>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(Value::LargeText(text)) => Ok(Some(text.to_string())),
            Some(other) => Err(Error::type_mismatch(path, expected, other.kind())),
        }
    }
}

fn scalar_text(path: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::LargeText(text) => Ok(text.to_string()),
        Value::Boolean(flag) => Ok(if *flag { "true" } else { "false" }.to_string()),
        Value::Number(num) => Ok(format_number(*num)),
        other => Err(Error::type_mismatch(path, "string", other.kind())),
    }
}

fn parse_numeric(path: &str, text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let plausible = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'));
    if plausible {
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(value);
        }
    }
    Err(Error::conversion(path, format!("'{text}' is not numeric")))
}

#[derive(Debug, Clone, PartialEq)]
enum PatternToken {
    Literal(SmolStr),
    Wildcard,
}

fn tokenize_pattern(pattern: &str) -> SmallVec<[PatternToken; 8]> {
    let mut tokens = SmallVec::new();
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '%' | '.' | '[' | ']' => {
                if !literal.is_empty() {
                    tokens.push(PatternToken::Literal(SmolStr::new(&literal)));
                    literal.clear();
                }
                if ch == '%' {
                    tokens.push(PatternToken::Wildcard);
                } else {
                    tokens.push(PatternToken::Literal(SmolStr::new(ch.to_string())));
                }
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        tokens.push(PatternToken::Literal(SmolStr::new(&literal)));
    }
    tokens
}

/// `reach[t][i]`: the first `t` tokens can consume exactly the first
/// `i` characters of `path`.
fn reach_table(tokens: &[PatternToken], path: &[char]) -> Vec<Vec<bool>> {
    let mut reach = vec![vec![false; path.len() + 1]; tokens.len() + 1];
    reach[0][0] = true;
    for (t, token) in tokens.iter().enumerate() {
        match token {
            PatternToken::Literal(lit) => {
                let lit: Vec<char> = lit.chars().collect();
                for i in 0..=path.len() {
                    if reach[t][i]
                        && i + lit.len() <= path.len()
                        && path[i..i + lit.len()] == lit[..]
                    {
                        reach[t + 1][i + lit.len()] = true;
                    }
                }
            }
            PatternToken::Wildcard => {
                let mut reachable = false;
                for i in 0..=path.len() {
                    reachable |= reach[t][i];
                    reach[t + 1][i] = reachable;
                }
            }
        }
    }
    reach
}

/// Longest token prefix consuming the whole of `path`, if any.
fn prefix_match(tokens: &[PatternToken], path: &str) -> Option<usize> {
    let chars: Vec<char> = path.chars().collect();
    let reach = reach_table(tokens, &chars);
    (1..=tokens.len()).rev().find(|&t| reach[t][chars.len()])
}

/// The prefix of `path` consumed by the first `return_tokens` tokens in
/// a full-pattern match, split as deep as possible.
fn return_portion(tokens: &[PatternToken], return_tokens: usize, path: &str) -> String {
    if return_tokens >= tokens.len() {
        return path.to_string();
    }
    let chars: Vec<char> = path.chars().collect();
    let reach = reach_table(tokens, &chars);

    // back[t][i]: tokens[t..] can consume path[i..] entirely.
    let mut back = vec![vec![false; chars.len() + 1]; tokens.len() + 1];
    back[tokens.len()][chars.len()] = true;
    for (t, token) in tokens.iter().enumerate().rev() {
        match token {
            PatternToken::Literal(lit) => {
                let lit: Vec<char> = lit.chars().collect();
                for i in 0..=chars.len() {
                    back[t][i] = i + lit.len() <= chars.len()
                        && chars[i..i + lit.len()] == lit[..]
                        && back[t + 1][i + lit.len()];
                }
            }
            PatternToken::Wildcard => {
                let mut reachable = false;
                for i in (0..=chars.len()).rev() {
                    reachable |= back[t + 1][i];
                    back[t][i] = reachable;
                }
            }
        }
    }

    let split = (0..=chars.len())
        .rev()
        .find(|&i| reach[return_tokens][i] && back[return_tokens][i])
        .unwrap_or(chars.len());
    chars[..split].iter().collect()
}

/// SQL-LIKE style match where `%` spans any run of characters.
fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let mut matches = vec![vec![false; t.len() + 1]; p.len() + 1];
    matches[0][0] = true;
    for i in 0..p.len() {
        if p[i] == '%' {
            let mut reachable = false;
            for j in 0..=t.len() {
                reachable |= matches[i][j];
                matches[i + 1][j] = reachable;
            }
        } else {
            for j in 0..t.len() {
                matches[i + 1][j + 1] = matches[i][j] && p[i] == t[j];
            }
        }
    }
    matches[p.len()][t.len()]
}
