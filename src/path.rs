use crate::constants::ROOT_PATH;

/// One positional substitution value for [`format_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    Str(String),
    Int(i64),
}

impl PathArg {
    fn render(&self) -> String {
        match self {
            PathArg::Str(text) => text.clone(),
            PathArg::Int(value) => {
                let mut buffer = itoa::Buffer::new();
                buffer.format(*value).to_string()
            }
        }
    }
}

impl From<&str> for PathArg {
    fn from(value: &str) -> Self {
        PathArg::Str(value.to_string())
    }
}

impl From<String> for PathArg {
    fn from(value: String) -> Self {
        PathArg::Str(value)
    }
}

impl From<i64> for PathArg {
    fn from(value: i64) -> Self {
        PathArg::Int(value)
    }
}

impl From<usize> for PathArg {
    fn from(value: usize) -> Self {
        PathArg::Int(value as i64)
    }
}

/// Substitutes `%s`/`%d`/`%N` placeholders in a path expression.
///
/// Each `%s` or `%d` consumes the next argument in order. `%N` (a
/// single digit) names an argument by 0-based position and only its
/// first occurrence is substituted. Placeholders with no matching
/// argument, and any other `%`, pass through literally.
pub fn format_path(path: &str, args: &[PathArg]) -> String {
    if args.is_empty() || !path.contains('%') {
        return path.to_string();
    }
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    let mut cursor = 0usize;
    let mut used = [false; 10];
    let mut copied = 0usize;
    for pos in memchr::memchr_iter(b'%', bytes) {
        let Some(&marker) = bytes.get(pos + 1) else {
            break;
        };
        let replacement = match marker {
            b's' | b'd' => {
                if cursor < args.len() {
                    cursor += 1;
                    Some(args[cursor - 1].render())
                } else {
                    None
                }
            }
            b'0'..=b'9' => {
                let index = (marker - b'0') as usize;
                if index < args.len() && !used[index] {
                    used[index] = true;
                    Some(args[index].render())
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(replacement) = replacement {
            out.push_str(&path[copied..pos]);
            out.push_str(&replacement);
            copied = pos + 2;
        }
    }
    out.push_str(&path[copied..]);
    out
}

/// Appends member `name` to `parent`. The root path `"."` contributes
/// no leading separator; names that are not plain identifiers are
/// double-quoted with embedded quotes and backslashes escaped.
pub fn join(parent: &str, name: &str) -> String {
    let mut out = base(parent);
    if !out.is_empty() {
        out.push('.');
    }
    if is_plain_identifier(name) {
        out.push_str(name);
    } else {
        out.push('"');
        for ch in name.chars() {
            if ch == '"' || ch == '\\' {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push('"');
    }
    out
}

/// Array element path; indices are 1-based.
pub fn join_index(parent: &str, index: usize) -> String {
    let mut out = base(parent);
    let mut buffer = itoa::Buffer::new();
    out.push('[');
    out.push_str(buffer.format(index));
    out.push(']');
    out
}

fn base(parent: &str) -> String {
    if parent == ROOT_PATH {
        String::new()
    } else {
        parent.to_string()
    }
}

pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
