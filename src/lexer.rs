use crate::constants::SPILL_THRESHOLD;
use crate::error::{Error, Result};
use crate::largetext::LargeText;
use crate::options::ParseOptions;
use crate::reader::{CharReader, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    True,
    False,
    Null,
    Number(f64),
    String(String),
    /// String literal longer than [`SPILL_THRESHOLD`] characters,
    /// accumulated page-wise instead of in one buffer.
    LargeString(LargeText),
    Eof,
}

impl Token {
    /// Short description for expectation messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::LeftBrace => "'{'",
            Token::RightBrace => "'}'",
            Token::LeftBracket => "'['",
            Token::RightBracket => "']'",
            Token::Colon => "':'",
            Token::Comma => "','",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::Null => "'null'",
            Token::Number(_) => "number",
            Token::String(_) | Token::LargeString(_) => "string",
            Token::Eof => "end of input",
        }
    }
}

pub struct Lexer<'a> {
    reader: CharReader<'a>,
    strict: bool,
    token_pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(reader: CharReader<'a>, options: &ParseOptions) -> Self {
        Self {
            reader,
            strict: options.strict,
            token_pos: Position {
                line: 1,
                column: 0,
                index: 0,
            },
        }
    }

    /// Position of the first character of the current token.
    pub fn token_position(&self) -> Position {
        self.token_pos
    }

    pub fn next_token(&mut self) -> Result<Token> {
        let Some(ch) = self.reader.read_non_ws() else {
            self.token_pos = self.reader.position();
            return Ok(Token::Eof);
        };
        self.token_pos = self.reader.position();
        match ch {
            '{' => Ok(Token::LeftBrace),
            '}' => Ok(Token::RightBrace),
            '[' => Ok(Token::LeftBracket),
            ']' => Ok(Token::RightBracket),
            ':' => Ok(Token::Colon),
            ',' => Ok(Token::Comma),
            '"' => self.scan_string(),
            '-' | '0'..='9' => self.scan_number(ch),
            other => self.scan_word(other),
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        let position = self.reader.position();
        Error::parse_error(position.line, position.column, message)
    }

    /// `-?digit+('.'digit+)?([eE][+-]?digit+)?`, rejecting partial
    /// matches such as a lone `-` or a fraction with no digits.
    fn scan_number(&mut self, first: char) -> Result<Token> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Integer,
            FractionStarted,
            FractionDigits,
            ExponentMarker,
            ExponentSign,
            ExponentDigits,
        }

        let mut text = String::new();
        let mut ch = first;
        if ch == '-' {
            text.push(ch);
            ch = match self.reader.read() {
                Some(next) => next,
                None => return Err(self.error("digit expected after '-'")),
            };
            if !ch.is_ascii_digit() {
                return Err(self.error("digit expected after '-'"));
            }
        }
        text.push(ch);
        let mut state = State::Integer;
        loop {
            let Some(next) = self.reader.read() else {
                break;
            };
            let accepted = match (state, next) {
                (State::Integer, '0'..='9') => true,
                (State::Integer, '.') => {
                    state = State::FractionStarted;
                    true
                }
                (State::Integer, 'e' | 'E') => {
                    state = State::ExponentMarker;
                    true
                }
                (State::FractionStarted, '0'..='9') => {
                    state = State::FractionDigits;
                    true
                }
                (State::FractionDigits, '0'..='9') => true,
                (State::FractionDigits, 'e' | 'E') => {
                    state = State::ExponentMarker;
                    true
                }
                (State::ExponentMarker, '+' | '-') => {
                    state = State::ExponentSign;
                    true
                }
                (State::ExponentMarker | State::ExponentSign, '0'..='9') => {
                    state = State::ExponentDigits;
                    true
                }
                (State::ExponentDigits, '0'..='9') => true,
                _ => false,
            };
            if accepted {
                text.push(next);
            } else {
                self.reader.unread(next);
                break;
            }
        }
        match state {
            State::FractionStarted => Err(self.error("digit expected after decimal point")),
            State::ExponentMarker | State::ExponentSign => {
                Err(self.error("digit expected in exponent"))
            }
            _ => text
                .parse::<f64>()
                .map(Token::Number)
                .map_err(|_| self.error(format!("invalid number '{text}'"))),
        }
    }

    fn scan_string(&mut self) -> Result<Token> {
        let mut buffer = String::new();
        let mut spill: Option<LargeText> = None;
        let mut chars = 0usize;
        loop {
            let Some(ch) = self.reader.read() else {
                return Err(self.error("unterminated string"));
            };
            let decoded = match ch {
                '"' => break,
                '\\' => self.scan_escape()?,
                control if (control as u32) < 0x20 => {
                    if self.strict {
                        return Err(self.error(format!(
                            "unescaped control character U+{:04X} in string",
                            control as u32
                        )));
                    }
                    control
                }
                other => other,
            };
            chars += 1;
            match spill.as_mut() {
                Some(text) => text.push(decoded),
                None => {
                    buffer.push(decoded);
                    if chars > SPILL_THRESHOLD {
                        let mut text = LargeText::new();
                        text.push_str(&buffer);
                        buffer.clear();
                        spill = Some(text);
                    }
                }
            }
        }
        match spill {
            Some(text) => Ok(Token::LargeString(text)),
            None => Ok(Token::String(buffer)),
        }
    }

    fn scan_escape(&mut self) -> Result<char> {
        let Some(ch) = self.reader.read() else {
            return Err(self.error("unterminated escape sequence"));
        };
        Ok(match ch {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => self.scan_unicode_escape()?,
            other => return Err(self.error(format!("invalid escape sequence '\\{other}'"))),
        })
    }

    /// `\uXXXX`, pairing surrogates: a high surrogate must be followed
    /// immediately by a `\uXXXX` low surrogate.
    fn scan_unicode_escape(&mut self) -> Result<char> {
        let unit = self.scan_hex4()?;
        if (0xDC00..=0xDFFF).contains(&unit) {
            return Err(self.error("unpaired low surrogate in unicode escape"));
        }
        if !(0xD800..=0xDBFF).contains(&unit) {
            return char::from_u32(unit).ok_or_else(|| self.error("invalid unicode escape"));
        }
        if self.reader.read() != Some('\\') || self.reader.read() != Some('u') {
            return Err(self.error("low surrogate escape expected after high surrogate"));
        }
        let low = self.scan_hex4()?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(self.error("invalid low surrogate in unicode escape"));
        }
        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn scan_hex4(&mut self) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let Some(ch) = self.reader.read() else {
                return Err(self.error("unterminated unicode escape"));
            };
            let digit = ch
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex digit '{ch}' in unicode escape")))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    /// Keywords are case-sensitive; any other unquoted run is an error
    /// in strict mode and a string literal in lax mode.
    fn scan_word(&mut self, first: char) -> Result<Token> {
        let mut word = String::new();
        word.push(first);
        while let Some(ch) = self.reader.read() {
            if ch.is_whitespace() || matches!(ch, '{' | '}' | '[' | ']' | ':' | ',' | '"') {
                self.reader.unread(ch);
                break;
            }
            word.push(ch);
        }
        match word.as_str() {
            "true" => Ok(Token::True),
            "false" => Ok(Token::False),
            "null" => Ok(Token::Null),
            _ if self.strict => Err(Error::parse_error(
                self.token_pos.line,
                self.token_pos.column,
                format!("unexpected literal '{word}'"),
            )),
            _ => Ok(Token::String(word)),
        }
    }
}
