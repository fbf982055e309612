//! Streaming JSON generation over an abstract [`Sink`].
//!
//! The writer tracks open constructs on a nesting stack and owns all
//! comma, newline and indent bookkeeping, so callers interleave
//! open/write/close operations freely. Output leaves through the sink
//! incrementally; nothing is held beyond the sink's own buffering, and
//! the sink is flushed whenever nesting returns to the document level.

mod escape;
mod items;
mod sink;

pub use escape::{escape_json, escape_json_into};
pub use sink::{Sink, StreamSink, TextSink};

use std::io::Write;

use smallvec::SmallVec;

use crate::constants::ESCAPE_CHUNK;
use crate::error::{Error, Result};
use crate::largetext::{split_at_chars, LargeText};
use crate::options::OutputOptions;
use crate::path;
use crate::temporal::{DateTime, Timestamp};
use crate::value::{format_number, Value, ValueTable};
use crate::xml::Markup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    ObjectOpened,
    ObjectContinued,
    ArrayOpened,
    ArrayContinued,
}

pub struct JsonWriter<S> {
    sink: S,
    stack: SmallVec<[Frame; 16]>,
    indent_unit: String,
    indent_cache: Vec<String>,
    scratch: String,
}

impl<S: Sink> JsonWriter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, &OutputOptions::default())
    }

    pub fn with_options(sink: S, options: &OutputOptions) -> Self {
        Self {
            sink,
            stack: SmallVec::new(),
            indent_unit: " ".repeat(options.indent),
            indent_cache: vec![String::new()],
            scratch: String::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Closes everything still open, flushes, and hands back the sink.
    pub fn finish(mut self) -> Result<S> {
        self.close_all()?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    pub fn open_object(&mut self) -> Result<()> {
        self.open(None, Frame::ObjectOpened)
    }

    pub fn open_object_named(&mut self, name: &str) -> Result<()> {
        self.open(Some(name), Frame::ObjectOpened)
    }

    pub fn open_array(&mut self) -> Result<()> {
        self.open(None, Frame::ArrayOpened)
    }

    pub fn open_array_named(&mut self, name: &str) -> Result<()> {
        self.open(Some(name), Frame::ArrayOpened)
    }

    pub fn close_object(&mut self) -> Result<()> {
        self.close(true)
    }

    pub fn close_array(&mut self) -> Result<()> {
        self.close(false)
    }

    /// Closes all open constructs innermost-first.
    pub fn close_all(&mut self) -> Result<()> {
        while let Some(frame) = self.stack.last() {
            match frame {
                Frame::ObjectOpened | Frame::ObjectContinued => self.close_object()?,
                Frame::ArrayOpened | Frame::ArrayContinued => self.close_array()?,
            }
        }
        Ok(())
    }

    pub fn write_null(&mut self, name: &str) -> Result<()> {
        self.put_literal(Some(name), "null")
    }

    pub fn append_null(&mut self) -> Result<()> {
        self.put_literal(None, "null")
    }

    pub fn write_boolean(&mut self, name: &str, value: bool) -> Result<()> {
        self.put_literal(Some(name), if value { "true" } else { "false" })
    }

    pub fn append_boolean(&mut self, value: bool) -> Result<()> {
        self.put_literal(None, if value { "true" } else { "false" })
    }

    pub fn write_number(&mut self, name: &str, value: f64) -> Result<()> {
        self.put_literal(Some(name), &format_number(value))
    }

    pub fn append_number(&mut self, value: f64) -> Result<()> {
        self.put_literal(None, &format_number(value))
    }

    pub fn write_string(&mut self, name: &str, value: &str) -> Result<()> {
        self.put_string(Some(name), value)
    }

    pub fn append_string(&mut self, value: &str) -> Result<()> {
        self.put_string(None, value)
    }

    pub fn write_largetext(&mut self, name: &str, value: &LargeText) -> Result<()> {
        self.put_largetext(Some(name), value)
    }

    pub fn append_largetext(&mut self, value: &LargeText) -> Result<()> {
        self.put_largetext(None, value)
    }

    pub fn write_datetime(&mut self, name: &str, value: DateTime) -> Result<()> {
        self.put_string(Some(name), &value.to_string())
    }

    pub fn append_datetime(&mut self, value: DateTime) -> Result<()> {
        self.put_string(None, &value.to_string())
    }

    /// Writes the timestamp without its UTC offset.
    pub fn write_timestamp(&mut self, name: &str, value: Timestamp) -> Result<()> {
        self.put_string(Some(name), &strip_offset(value).to_string())
    }

    pub fn append_timestamp(&mut self, value: Timestamp) -> Result<()> {
        self.put_string(None, &strip_offset(value).to_string())
    }

    pub fn write_timestamp_tz(&mut self, name: &str, value: Timestamp) -> Result<()> {
        self.put_string(Some(name), &value.to_string())
    }

    pub fn append_timestamp_tz(&mut self, value: Timestamp) -> Result<()> {
        self.put_string(None, &value.to_string())
    }

    /// Writes the member only when a value is present.
    pub fn write_opt_string(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(text) => self.write_string(name, text),
            None => Ok(()),
        }
    }

    pub fn write_opt_number(&mut self, name: &str, value: Option<f64>) -> Result<()> {
        match value {
            Some(num) => self.write_number(name, num),
            None => Ok(()),
        }
    }

    pub fn write_opt_boolean(&mut self, name: &str, value: Option<bool>) -> Result<()> {
        match value {
            Some(flag) => self.write_boolean(name, flag),
            None => Ok(()),
        }
    }

    pub fn write_string_array(&mut self, name: &str, values: &[Option<String>]) -> Result<()> {
        self.open_array_named(name)?;
        self.put_string_elements(values)
    }

    pub fn append_string_array(&mut self, values: &[Option<String>]) -> Result<()> {
        self.open_array()?;
        self.put_string_elements(values)
    }

    pub fn write_number_array(&mut self, name: &str, values: &[Option<f64>]) -> Result<()> {
        self.open_array_named(name)?;
        self.put_number_elements(values)
    }

    pub fn append_number_array(&mut self, values: &[Option<f64>]) -> Result<()> {
        self.open_array()?;
        self.put_number_elements(values)
    }

    /// Writes the subtree stored under `path`. A path with no entry
    /// writes nothing, like the suppressed `write_opt_*` forms.
    pub fn write_subtree(&mut self, name: &str, table: &ValueTable, path: &str) -> Result<()> {
        self.put_subtree(Some(name), table, path)
    }

    pub fn append_subtree(&mut self, table: &ValueTable, path: &str) -> Result<()> {
        self.put_subtree(None, table, path)
    }

    /// Converts the markup through the JSON conventions and writes the
    /// resulting value.
    pub fn write_markup(&mut self, name: &str, markup: &Markup) -> Result<()> {
        let value = markup.to_value()?;
        self.put_value(Some(name), &value)
    }

    pub fn append_markup(&mut self, markup: &Markup) -> Result<()> {
        let value = markup.to_value()?;
        self.put_value(None, &value)
    }

    pub fn write_value(&mut self, name: &str, value: &serde_json::Value) -> Result<()> {
        self.put_value(Some(name), value)
    }

    pub fn append_value(&mut self, value: &serde_json::Value) -> Result<()> {
        self.put_value(None, value)
    }

    /// Appends a pre-formatted fragment verbatim. Separator bookkeeping
    /// still runs, so inside an object the fragment must carry its own
    /// member name.
    pub fn write_raw(&mut self, fragment: &str) -> Result<()> {
        if self.stack.is_empty() {
            self.sink.write_text(fragment)?;
            return self.sink.flush();
        }
        self.separate()?;
        self.sink.write_text(fragment)
    }

    fn open(&mut self, name: Option<&str>, frame: Frame) -> Result<()> {
        self.begin_entry(name)?;
        self.sink
            .write_text(if frame == Frame::ObjectOpened { "{" } else { "[" })?;
        self.stack.push(frame);
        Ok(())
    }

    fn close(&mut self, object: bool) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::writer_state("nothing is open"))?;
        let was_object = matches!(frame, Frame::ObjectOpened | Frame::ObjectContinued);
        if was_object != object {
            self.stack.push(frame);
            return Err(Error::writer_state(if object {
                "close_object called while an array is open"
            } else {
                "close_array called while an object is open"
            }));
        }
        if matches!(frame, Frame::ObjectContinued | Frame::ArrayContinued) {
            let depth = self.stack.len();
            self.newline_indent(depth)?;
        }
        self.sink.write_text(if object { "}" } else { "]" })?;
        if self.stack.is_empty() {
            self.sink.flush()?;
        }
        Ok(())
    }

    fn begin_entry(&mut self, name: Option<&str>) -> Result<()> {
        match self.stack.last() {
            None => {
                if name.is_some() {
                    return Err(Error::writer_state("a named value requires an open object"));
                }
            }
            Some(Frame::ObjectOpened | Frame::ObjectContinued) => {
                if name.is_none() {
                    return Err(Error::writer_state("values inside an object require a name"));
                }
            }
            Some(Frame::ArrayOpened | Frame::ArrayContinued) => {
                if name.is_some() {
                    return Err(Error::writer_state("array elements cannot be named"));
                }
            }
        }
        self.separate()?;
        if let Some(name) = name {
            self.scratch.clear();
            self.scratch.push('"');
            escape_json_into(&mut self.scratch, name);
            self.scratch.push_str("\":");
            if !self.indent_unit.is_empty() {
                self.scratch.push(' ');
            }
            self.sink.write_text(&self.scratch)?;
        }
        Ok(())
    }

    fn separate(&mut self) -> Result<()> {
        let depth = self.stack.len();
        let Some(top) = self.stack.last().copied() else {
            return Ok(());
        };
        match top {
            Frame::ObjectOpened => {
                if let Some(frame) = self.stack.last_mut() {
                    *frame = Frame::ObjectContinued;
                }
            }
            Frame::ArrayOpened => {
                if let Some(frame) = self.stack.last_mut() {
                    *frame = Frame::ArrayContinued;
                }
            }
            Frame::ObjectContinued | Frame::ArrayContinued => self.sink.write_text(",")?,
        }
        self.newline_indent(depth)
    }

    fn newline_indent(&mut self, depth: usize) -> Result<()> {
        if self.indent_unit.is_empty() {
            return Ok(());
        }
        if depth >= self.indent_cache.len() {
            self.extend_indent_cache(depth);
        }
        self.sink.write_text("\n")?;
        self.sink.write_text(&self.indent_cache[depth])
    }

    fn extend_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let next = match self.indent_cache.last() {
                Some(prev) => {
                    let mut unit = String::with_capacity(prev.len() + self.indent_unit.len());
                    unit.push_str(prev);
                    unit.push_str(&self.indent_unit);
                    unit
                }
                None => String::new(),
            };
            self.indent_cache.push(next);
        }
    }

    fn begin_value(&mut self, name: Option<&str>) -> Result<()> {
        if self.stack.is_empty() {
            return Err(Error::writer_state("no object or array is open"));
        }
        self.begin_entry(name)
    }

    fn put_literal(&mut self, name: Option<&str>, rendered: &str) -> Result<()> {
        self.begin_value(name)?;
        self.sink.write_text(rendered)
    }

    fn put_string(&mut self, name: Option<&str>, text: &str) -> Result<()> {
        self.begin_value(name)?;
        self.scratch.clear();
        self.scratch.push('"');
        escape_json_into(&mut self.scratch, text);
        self.scratch.push('"');
        self.sink.write_text(&self.scratch)
    }

    /// Escapes and streams the text in bounded chunks so multi-megabyte
    /// values never materialize as one escaped string.
    fn put_largetext(&mut self, name: Option<&str>, value: &LargeText) -> Result<()> {
        self.begin_value(name)?;
        self.sink.write_text("\"")?;
        for page in value.pages() {
            let mut rest = page;
            while !rest.is_empty() {
                let (head, tail, _) = split_at_chars(rest, ESCAPE_CHUNK);
                self.scratch.clear();
                escape_json_into(&mut self.scratch, head);
                self.sink.write_text(&self.scratch)?;
                rest = tail;
            }
        }
        self.sink.write_text("\"")
    }

    fn put_string_elements(&mut self, values: &[Option<String>]) -> Result<()> {
        for value in values {
            match value {
                Some(text) => self.append_string(text)?,
                None => self.append_null()?,
            }
        }
        self.close_array()
    }

    fn put_number_elements(&mut self, values: &[Option<f64>]) -> Result<()> {
        for value in values {
            match value {
                Some(num) => self.append_number(*num)?,
                None => self.append_null()?,
            }
        }
        self.close_array()
    }

    fn put_subtree(&mut self, name: Option<&str>, table: &ValueTable, path: &str) -> Result<()> {
        let Some(value) = table.get(path) else {
            return Ok(());
        };
        match value {
            Value::Null => self.put_literal(name, "null"),
            Value::Boolean(flag) => self.put_literal(name, if *flag { "true" } else { "false" }),
            Value::Number(num) => self.put_literal(name, &format_number(*num)),
            Value::String(text) => self.put_string(name, text),
            Value::LargeText(text) => self.put_largetext(name, text),
            Value::Object(members) => {
                self.open(name, Frame::ObjectOpened)?;
                for member in members {
                    let child = path::join(path, member.as_str());
                    self.put_subtree(Some(member.as_str()), table, &child)?;
                }
                self.close_object()
            }
            Value::Array(count) => {
                let count = *count;
                self.open(name, Frame::ArrayOpened)?;
                for index in 1..=count {
                    self.put_subtree(None, table, &path::join_index(path, index))?;
                }
                self.close_array()
            }
        }
    }

    fn put_value(&mut self, name: Option<&str>, value: &serde_json::Value) -> Result<()> {
        match value {
            serde_json::Value::Null => self.put_literal(name, "null"),
            serde_json::Value::Bool(flag) => {
                self.put_literal(name, if *flag { "true" } else { "false" })
            }
            serde_json::Value::Number(num) => {
                let rendered = match (num.as_i64(), num.as_f64()) {
                    (Some(int), _) => itoa::Buffer::new().format(int).to_string(),
                    (None, Some(float)) => format_number(float),
                    (None, None) => "null".to_string(),
                };
                self.put_literal(name, &rendered)
            }
            serde_json::Value::String(text) => self.put_string(name, text),
            serde_json::Value::Array(items) => {
                self.open(name, Frame::ArrayOpened)?;
                for item in items {
                    self.put_value(None, item)?;
                }
                self.close_array()
            }
            serde_json::Value::Object(map) => {
                self.open(name, Frame::ObjectOpened)?;
                for (member, item) in map {
                    self.put_value(Some(member), item)?;
                }
                self.close_object()
            }
        }
    }
}

impl<W: Write> JsonWriter<StreamSink<W>> {
    /// Generation into an output stream, honoring the header and cache
    /// settings of `options`.
    pub fn to_stream(out: W, options: OutputOptions) -> Self {
        let indent = options.indent;
        Self::with_options(
            StreamSink::new(out, options),
            &OutputOptions::default().with_indent(indent),
        )
    }

    /// Closes, drains and returns the underlying stream.
    pub fn into_stream(self) -> Result<W> {
        self.finish()?.into_inner()
    }
}

impl JsonWriter<TextSink> {
    /// Generation into an in-memory large-text buffer.
    pub fn to_text(options: &OutputOptions) -> Self {
        Self::with_options(TextSink::new(), options)
    }

    /// Closes everything and returns the accumulated text.
    pub fn into_output(self) -> Result<LargeText> {
        let mut sink = self.finish()?;
        Ok(sink.take_output().unwrap_or_default())
    }
}

fn strip_offset(mut value: Timestamp) -> Timestamp {
    value.offset_minutes = None;
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_writer() -> JsonWriter<TextSink> {
        JsonWriter::to_text(&OutputOptions::default())
    }

    fn compact_writer() -> JsonWriter<TextSink> {
        JsonWriter::to_text(&OutputOptions::default().with_indent(0))
    }

    #[rstest::rstest]
    fn test_pretty_nesting_and_commas() {
        let mut writer = text_writer();
        writer.open_object().unwrap();
        writer.write_string("name", "a b").unwrap();
        writer.write_number("n", 1.5).unwrap();
        writer.open_array_named("items").unwrap();
        writer.append_boolean(true).unwrap();
        writer.append_null().unwrap();
        let out = writer.into_output().unwrap();
        assert_eq!(
            out.to_string(),
            "{\n  \"name\": \"a\\u0020b\",\n  \"n\": 1.5,\n  \"items\": [\n    true,\n    null\n  ]\n}"
        );
    }

    #[rstest::rstest]
    fn test_compact_output() {
        let mut writer = compact_writer();
        writer.open_object().unwrap();
        writer.write_number("a", 1.0).unwrap();
        writer.open_array_named("b").unwrap();
        writer.append_number(2.0).unwrap();
        writer.append_number(3.0).unwrap();
        let out = writer.into_output().unwrap();
        assert_eq!(out.to_string(), "{\"a\":1,\"b\":[2,3]}");
    }

    #[rstest::rstest]
    fn test_close_object_on_array_fails() {
        let mut writer = compact_writer();
        writer.open_array().unwrap();
        let err = writer.close_object().unwrap_err();
        assert!(matches!(err, Error::WriterState(_)));
        // The array is still open and usable.
        writer.append_number(1.0).unwrap();
        assert_eq!(writer.into_output().unwrap().to_string(), "[1]");
    }

    #[rstest::rstest]
    fn test_close_without_open_fails() {
        let mut writer = compact_writer();
        assert!(writer.close_object().is_err());
        assert!(writer.close_array().is_err());
    }

    #[rstest::rstest]
    fn test_close_all_balances_interleaved_nesting() {
        let mut writer = compact_writer();
        writer.open_object().unwrap();
        writer.open_array_named("a").unwrap();
        writer.open_object().unwrap();
        writer.open_array_named("b").unwrap();
        writer.close_all().unwrap();
        assert_eq!(writer.into_output().unwrap().to_string(), "{\"a\":[{\"b\":[]}]}");
    }

    #[rstest::rstest]
    fn test_names_required_inside_objects_only() {
        let mut writer = compact_writer();
        writer.open_object().unwrap();
        assert!(writer.append_number(1.0).is_err());
        writer.write_number("ok", 1.0).unwrap();
        writer.open_array_named("arr").unwrap();
        assert!(writer.write_number("bad", 2.0).is_err());
        writer.append_number(2.0).unwrap();
    }

    #[rstest::rstest]
    fn test_scalar_before_any_open_fails() {
        let mut writer = compact_writer();
        assert!(writer.append_number(1.0).is_err());
        assert!(writer.write_string("a", "b").is_err());
    }

    #[rstest::rstest]
    fn test_write_raw_keeps_separators() {
        let mut writer = compact_writer();
        writer.open_array().unwrap();
        writer.append_number(1.0).unwrap();
        writer.write_raw("{\"pre\":true}").unwrap();
        writer.append_number(2.0).unwrap();
        assert_eq!(
            writer.into_output().unwrap().to_string(),
            "[1,{\"pre\":true},2]"
        );
    }

    #[rstest::rstest]
    fn test_non_finite_numbers_write_null() {
        let mut writer = compact_writer();
        writer.open_array().unwrap();
        writer.append_number(f64::NAN).unwrap();
        writer.append_number(f64::INFINITY).unwrap();
        assert_eq!(writer.into_output().unwrap().to_string(), "[null,null]");
    }

    #[rstest::rstest]
    fn test_opt_writes_omit_missing_members() {
        let mut writer = compact_writer();
        writer.open_object().unwrap();
        writer.write_opt_string("a", None).unwrap();
        writer.write_opt_number("b", Some(2.0)).unwrap();
        writer.write_opt_boolean("c", None).unwrap();
        assert_eq!(writer.into_output().unwrap().to_string(), "{\"b\":2}");
    }

    #[rstest::rstest]
    fn test_string_arrays_with_null_elements() {
        let mut writer = compact_writer();
        writer.open_object().unwrap();
        writer
            .write_string_array("tags", &[Some("a".to_string()), None])
            .unwrap();
        assert_eq!(
            writer.into_output().unwrap().to_string(),
            "{\"tags\":[\"a\",null]}"
        );
    }

    #[rstest::rstest]
    fn test_timestamp_offset_stripped_unless_tz() {
        let stamp = Timestamp::parse("2024-02-29T12:00:00.5+01:30").unwrap();
        let mut writer = compact_writer();
        writer.open_object().unwrap();
        writer.write_timestamp("plain", stamp).unwrap();
        writer.write_timestamp_tz("zoned", stamp).unwrap();
        let out = writer.into_output().unwrap().to_string();
        assert_eq!(
            out,
            concat!(
                "{\"plain\":\"2024\\u002D02\\u002D29T12\\u003A00\\u003A00.5\",",
                "\"zoned\":\"2024\\u002D02\\u002D29T12\\u003A00\\u003A00.5\\u002B01\\u003A30\"}"
            )
        );
    }

    #[rstest::rstest]
    fn test_value_bridge_roundtrip() {
        let value = serde_json::json!({"a": [1, {"b": null}], "c": "x"});
        let mut writer = compact_writer();
        writer.append_value(&value).unwrap();
        let out = writer.into_output().unwrap().to_string();
        assert_eq!(
            crate::parse(&out).unwrap().to_value(crate::constants::ROOT_PATH),
            Some(value)
        );
    }
}
