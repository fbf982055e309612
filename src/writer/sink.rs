use std::io::{self, Write};

use crate::constants::FLUSH_THRESHOLD;
use crate::error::Result;
use crate::largetext::LargeText;
use crate::options::{CachePolicy, OutputOptions};

/// Destination for generated text fragments.
pub trait Sink {
    fn write_text(&mut self, text: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Buffering sink over an [`io::Write`] stream.
///
/// Fragments accumulate until [`FLUSH_THRESHOLD`] bytes are pending,
/// then drain to the underlying stream. When header emission is
/// enabled, the first drain is preceded by a CGI-style response header
/// block (`Content-Type`, cache policy, optional `ETag`, blank line).
pub struct StreamSink<W> {
    out: W,
    buffer: String,
    options: OutputOptions,
    header_pending: bool,
}

impl<W: Write> StreamSink<W> {
    pub fn new(out: W, options: OutputOptions) -> Self {
        let header_pending = options.emit_header;
        Self {
            out,
            buffer: String::with_capacity(FLUSH_THRESHOLD),
            options,
            header_pending,
        }
    }

    /// Drains pending output and returns the underlying stream.
    pub fn into_inner(mut self) -> Result<W> {
        Sink::flush(&mut self)?;
        Ok(self.out)
    }

    fn emit_header(&mut self) -> io::Result<()> {
        self.out.write_all(b"Content-Type: application/json\n")?;
        match self.options.cache {
            CachePolicy::Allow => self.out.write_all(b"Cache-Control: public\n")?,
            CachePolicy::Forbid => self.out.write_all(b"Cache-Control: no-store\n")?,
            CachePolicy::Omit => {}
        }
        if let Some(etag) = &self.options.etag {
            writeln!(self.out, "ETag: \"{etag}\"")?;
        }
        self.out.write_all(b"\n")
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        if self.buffer.len() > FLUSH_THRESHOLD {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.header_pending {
            self.header_pending = false;
            self.emit_header()?;
        }
        self.out.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();
        self.out.flush()?;
        Ok(())
    }
}

/// In-memory sink accumulating into a lazily allocated [`LargeText`].
#[derive(Debug, Default)]
pub struct TextSink {
    output: Option<LargeText>,
}

impl TextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> Option<&LargeText> {
        self.output.as_ref()
    }

    pub fn take_output(&mut self) -> Option<LargeText> {
        self.output.take()
    }

    /// Releases the accumulated text without returning it.
    pub fn free(&mut self) {
        self.output = None;
    }
}

impl Sink for TextSink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.output.get_or_insert_with(LargeText::new).push_str(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_stream_sink_header_before_body() {
        let options = OutputOptions::default().with_cache(CachePolicy::Forbid);
        let mut sink = StreamSink::new(Vec::new(), options);
        sink.write_text("{}").unwrap();
        let out = sink.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Content-Type: application/json\nCache-Control: no-store\n\n{}"
        );
    }

    #[rstest::rstest]
    fn test_stream_sink_header_only_once() {
        let mut sink = StreamSink::new(Vec::new(), OutputOptions::default());
        sink.write_text("a").unwrap();
        sink.flush().unwrap();
        sink.write_text("b").unwrap();
        let out = sink.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Content-Type: application/json\n\nab"
        );
    }

    #[rstest::rstest]
    fn test_stream_sink_etag_line() {
        let options = OutputOptions::default().with_etag("v1");
        let mut sink = StreamSink::new(Vec::new(), options);
        sink.write_text("[]").unwrap();
        let out = sink.into_inner().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Content-Type: application/json\nETag: \"v1\"\n\n[]"
        );
    }

    #[rstest::rstest]
    fn test_stream_sink_headerless() {
        let options = OutputOptions::default().with_emit_header(false);
        let mut sink = StreamSink::new(Vec::new(), options);
        sink.write_text("1").unwrap();
        let out = sink.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1");
    }

    #[rstest::rstest]
    fn test_stream_sink_drains_past_threshold() {
        let options = OutputOptions::default().with_emit_header(false);
        let mut sink = StreamSink::new(Vec::new(), options);
        let chunk = "x".repeat(FLUSH_THRESHOLD + 1);
        sink.write_text(&chunk).unwrap();
        assert_eq!(sink.out.len(), FLUSH_THRESHOLD + 1);
        assert!(sink.buffer.is_empty());
    }

    #[rstest::rstest]
    fn test_text_sink_lazy_allocation() {
        let mut sink = TextSink::new();
        assert!(sink.output().is_none());
        sink.write_text("hello").unwrap();
        assert_eq!(sink.output().map(LargeText::to_string), Some("hello".to_string()));
        sink.free();
        assert!(sink.output().is_none());
    }
}
