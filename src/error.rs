use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Lexical or grammar violation; parsing aborts at the reported
    /// position without partial results.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A path resolved to a value whose kind the accessor cannot serve.
    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value exists but its content cannot be converted as requested.
    #[error("cannot convert value at '{path}': {message}")]
    Conversion { path: String, message: String },

    /// The writer was asked to do something its nesting state forbids.
    #[error("writer state error: {0}")]
    WriterState(String),

    /// Markup given to the JSON transform does not follow the
    /// generator's conventions.
    #[error("markup error: {0}")]
    Markup(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn type_mismatch(path: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            expected,
            found,
        }
    }

    pub fn conversion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Conversion {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn writer_state(message: impl Into<String>) -> Self {
        Error::WriterState(message.into())
    }

    pub fn markup(message: impl Into<String>) -> Self {
        Error::Markup(message.into())
    }
}
