pub mod sink;

pub use sink::DocSink;

use crate::constants::MAX_DEPTH;
use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::options::ParseOptions;
use crate::reader::CharReader;
use crate::value::ValueTable;
use crate::xml::Markup;

use sink::{TableSink, XmlSink};

/// Recursive-descent walk over the token stream, driving a [`DocSink`].
///
/// A document must begin with `{` or `[`; top-level scalars and any
/// trailing text after the document are rejected. In lax mode trailing
/// commas and unquoted names/scalars are accepted; errors are fatal in
/// both modes and carry the offending position.
pub struct Parser<'a, S> {
    lexer: Lexer<'a>,
    sink: S,
    strict: bool,
    depth: usize,
}

impl<'a, S: DocSink> Parser<'a, S> {
    pub fn new(reader: CharReader<'a>, options: &ParseOptions, sink: S) -> Self {
        Self {
            lexer: Lexer::new(reader, options),
            sink,
            strict: options.strict,
            depth: 0,
        }
    }

    pub fn parse_document(mut self) -> Result<S> {
        match self.lexer.next_token()? {
            Token::LeftBrace => self.parse_object()?,
            Token::LeftBracket => self.parse_array()?,
            other => return Err(self.unexpected(&other, "'{' or '['")),
        }
        match self.lexer.next_token()? {
            Token::Eof => Ok(self.sink),
            trailing => Err(self.unexpected(&trailing, "end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<()> {
        self.enter()?;
        self.sink.begin_object()?;
        let mut token = self.lexer.next_token()?;
        if token == Token::RightBrace {
            return self.finish_object();
        }
        loop {
            let name = match token {
                Token::String(name) => name,
                Token::LargeString(name) => name.to_string(),
                other => return Err(self.unexpected(&other, "object member name")),
            };
            match self.lexer.next_token()? {
                Token::Colon => {}
                other => return Err(self.unexpected(&other, "':'")),
            }
            self.sink.begin_member(&name)?;
            let value = self.lexer.next_token()?;
            self.parse_value(value)?;
            self.sink.end_member()?;
            match self.lexer.next_token()? {
                Token::Comma => {
                    token = self.lexer.next_token()?;
                    if token == Token::RightBrace {
                        if self.strict {
                            return Err(self.error_here("trailing comma before '}'"));
                        }
                        return self.finish_object();
                    }
                }
                Token::RightBrace => return self.finish_object(),
                other => return Err(self.unexpected(&other, "',' or '}'")),
            }
        }
    }

    fn finish_object(&mut self) -> Result<()> {
        self.sink.end_object()?;
        self.leave();
        Ok(())
    }

    fn parse_array(&mut self) -> Result<()> {
        self.enter()?;
        self.sink.begin_array()?;
        let mut token = self.lexer.next_token()?;
        if token == Token::RightBracket {
            return self.finish_array();
        }
        let mut index = 0usize;
        loop {
            index += 1;
            self.sink.begin_element(index)?;
            self.parse_value(token)?;
            self.sink.end_element()?;
            match self.lexer.next_token()? {
                Token::Comma => {
                    token = self.lexer.next_token()?;
                    if token == Token::RightBracket {
                        if self.strict {
                            return Err(self.error_here("trailing comma before ']'"));
                        }
                        return self.finish_array();
                    }
                }
                Token::RightBracket => return self.finish_array(),
                other => return Err(self.unexpected(&other, "',' or ']'")),
            }
        }
    }

    fn finish_array(&mut self) -> Result<()> {
        self.sink.end_array()?;
        self.leave();
        Ok(())
    }

    fn parse_value(&mut self, token: Token) -> Result<()> {
        match token {
            Token::LeftBrace => self.parse_object(),
            Token::LeftBracket => self.parse_array(),
            Token::String(value) => self.sink.string(value),
            Token::LargeString(value) => self.sink.large_string(value),
            Token::Number(value) => self.sink.number(value),
            Token::True => self.sink.boolean(true),
            Token::False => self.sink.boolean(false),
            Token::Null => self.sink.null(),
            other => Err(self.unexpected(&other, "value")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_here("maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn error_here(&self, message: impl Into<String>) -> Error {
        let position = self.lexer.token_position();
        Error::parse_error(position.line, position.column, message)
    }

    fn unexpected(&self, token: &Token, expected: &str) -> Error {
        self.error_here(format!("expected {expected}, found {}", token.describe()))
    }
}

pub(crate) fn parse_to_table(reader: CharReader<'_>, options: &ParseOptions) -> Result<ValueTable> {
    let parser = Parser::new(reader, options, TableSink::new());
    Ok(parser.parse_document()?.into_table())
}

pub(crate) fn parse_to_markup(reader: CharReader<'_>, options: &ParseOptions) -> Result<Markup> {
    let parser = Parser::new(reader, options, XmlSink::new());
    Ok(parser.parse_document()?.finish())
}
