//! JSON string escaping with a conservative ASCII whitelist.
//!
//! Only alphanumerics, comma, dot and underscore pass through
//! untouched. Quote, backslash, slash and the common control
//! characters use their two-character escapes; every other code point,
//! space included, is emitted as an uppercase `\uXXXX` unit so the
//! output stays seven-bit clean regardless of the sink's encoding.

#[derive(Clone, Copy)]
enum Class {
    Plain,
    Short(&'static str),
    Hex,
}

const ASCII_CLASSES: [Class; 128] = build_ascii_classes();

const fn build_ascii_classes() -> [Class; 128] {
    let mut table = [Class::Hex; 128];
    let mut code = 0usize;
    while code < 128 {
        let byte = code as u8;
        if byte.is_ascii_alphanumeric() || matches!(byte, b',' | b'.' | b'_') {
            table[code] = Class::Plain;
        }
        code += 1;
    }
    table[b'"' as usize] = Class::Short("\\\"");
    table[b'\\' as usize] = Class::Short("\\\\");
    table[b'/' as usize] = Class::Short("\\/");
    table[0x08] = Class::Short("\\b");
    table[b'\n' as usize] = Class::Short("\\n");
    table[b'\r' as usize] = Class::Short("\\r");
    table[b'\t' as usize] = Class::Short("\\t");
    table
}

/// Escape `text` for inclusion inside a JSON string literal.
///
/// # Examples
/// ```
/// use flatjson::escape_json;
///
/// assert_eq!(escape_json("say \"hi\""), "say\\u0020\\\"hi\\\"");
/// ```
pub fn escape_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_json_into(&mut out, text);
    out
}

pub fn escape_json_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        let code = ch as u32;
        if code < 128 {
            match ASCII_CLASSES[code as usize] {
                Class::Plain => out.push(ch),
                Class::Short(escape) => out.push_str(escape),
                Class::Hex => push_hex_unit(out, code as u16),
            }
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                push_hex_unit(out, *unit);
            }
        }
    }
}

fn push_hex_unit(out: &mut String, unit: u16) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    out.push_str("\\u");
    out.push(DIGITS[(unit >> 12) as usize & 0xF] as char);
    out.push(DIGITS[(unit >> 8) as usize & 0xF] as char);
    out.push(DIGITS[(unit >> 4) as usize & 0xF] as char);
    out.push(DIGITS[(unit & 0xF) as usize] as char);
}
