pub mod constants;
pub mod error;
pub mod largetext;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod path;
mod query;
pub mod reader;
pub mod rowset;
pub mod temporal;
pub mod value;
pub mod writer;
pub mod xml;

pub use crate::error::{Error, Result};
pub use crate::largetext::LargeText;
pub use crate::options::{CachePolicy, OutputOptions, ParseOptions};
pub use crate::parser::{DocSink, Parser};
pub use crate::path::{format_path, PathArg};
pub use crate::reader::CharReader;
pub use crate::rowset::{Cell, Column, ColumnType, Link, RowSet};
pub use crate::temporal::{DateTime, Timestamp};
pub use crate::value::{format_number, Value, ValueTable};
pub use crate::writer::{escape_json, JsonWriter, Sink, StreamSink, TextSink};
pub use crate::xml::{markup_to_json, rowset_to_markup, Markup};

pub fn parse(source: &str) -> Result<ValueTable> {
    parse_with_options(source, &ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<ValueTable> {
    parser::parse_to_table(CharReader::from_str(source), options)
}

pub fn parse_lines(lines: &[String]) -> Result<ValueTable> {
    parse_lines_with_options(lines, &ParseOptions::default())
}

pub fn parse_lines_with_options(lines: &[String], options: &ParseOptions) -> Result<ValueTable> {
    parser::parse_to_table(CharReader::from_lines(lines), options)
}

pub fn parse_largetext(source: &LargeText) -> Result<ValueTable> {
    parse_largetext_with_options(source, &ParseOptions::default())
}

pub fn parse_largetext_with_options(
    source: &LargeText,
    options: &ParseOptions,
) -> Result<ValueTable> {
    parser::parse_to_table(CharReader::from_largetext(source), options)
}

pub fn parse_chunks(chunks: Vec<&str>) -> Result<ValueTable> {
    parse_chunks_with_options(chunks, &ParseOptions::default())
}

pub fn parse_chunks_with_options(chunks: Vec<&str>, options: &ParseOptions) -> Result<ValueTable> {
    parser::parse_to_table(CharReader::from_chunks(chunks, false), options)
}

pub fn to_xml(source: &str) -> Result<Markup> {
    to_xml_with_options(source, &ParseOptions::default())
}

pub fn to_xml_with_options(source: &str, options: &ParseOptions) -> Result<Markup> {
    parser::parse_to_markup(CharReader::from_str(source), options)
}

pub fn to_xml_lines(lines: &[String]) -> Result<Markup> {
    to_xml_lines_with_options(lines, &ParseOptions::default())
}

pub fn to_xml_lines_with_options(lines: &[String], options: &ParseOptions) -> Result<Markup> {
    parser::parse_to_markup(CharReader::from_lines(lines), options)
}

pub fn to_xml_chunks(chunks: Vec<&str>) -> Result<Markup> {
    to_xml_chunks_with_options(chunks, &ParseOptions::default())
}

pub fn to_xml_chunks_with_options(chunks: Vec<&str>, options: &ParseOptions) -> Result<Markup> {
    parser::parse_to_markup(CharReader::from_chunks(chunks, false), options)
}

pub fn to_xml_largetext(source: &LargeText) -> Result<Markup> {
    to_xml_largetext_with_options(source, &ParseOptions::default())
}

pub fn to_xml_largetext_with_options(
    source: &LargeText,
    options: &ParseOptions,
) -> Result<Markup> {
    parser::parse_to_markup(CharReader::from_largetext(source), options)
}

pub fn stringify_number(value: f64) -> String {
    format_number(value)
}

pub fn stringify_boolean(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub fn stringify_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    writer::escape_json_into(&mut out, text);
    out.push('"');
    out
}

pub fn stringify_datetime(value: DateTime) -> String {
    stringify_string(&value.to_string())
}

pub fn stringify_timestamp(value: Timestamp) -> String {
    stringify_string(&value.to_string())
}
