use crate::constants::DEFAULT_INDENT;

/// How generated output advertises cacheability in its header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// `Cache-Control: public`.
    Allow,
    /// `Cache-Control: no-store`.
    Forbid,
    /// No cache header at all.
    #[default]
    Omit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Enforce the RFC grammar. Lax mode additionally accepts unquoted
    /// scalars, unquoted member names and trailing commas.
    pub strict: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// SQL-style flag variant for callers that cannot pass booleans;
    /// anything but `N`/`n` keeps strict mode on.
    pub fn from_strict_flag(flag: &str) -> Self {
        Self {
            strict: !flag.eq_ignore_ascii_case("N"),
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    /// Write the mime/cache header block before the first byte of body
    /// output. Only stream sinks honor this; text sinks never write
    /// headers.
    pub emit_header: bool,
    pub cache: CachePolicy,
    /// Literal `ETag` header value, emitted with the header block.
    pub etag: Option<String>,
    /// Spaces per nesting level; `0` emits compact output.
    pub indent: usize,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emit_header(mut self, emit_header: bool) -> Self {
        self.emit_header = emit_header;
        self
    }

    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            emit_header: true,
            cache: CachePolicy::default(),
            etag: None,
            indent: DEFAULT_INDENT,
        }
    }
}
