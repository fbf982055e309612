/// Longest string literal the lexer keeps as a plain `String`; anything
/// longer spills into a [`LargeText`](crate::LargeText) accumulator.
pub const SPILL_THRESHOLD: usize = 8190;

/// Characters per page of a [`LargeText`](crate::LargeText) buffer.
pub const LARGE_TEXT_PAGE: usize = 8191;

/// Bytes a stream sink accumulates before pushing to the underlying writer.
pub const FLUSH_THRESHOLD: usize = 32_512;

/// Characters escaped per slice when streaming long string values.
pub const ESCAPE_CHUNK: usize = 5_000;

/// Spaces per nesting level unless overridden in
/// [`OutputOptions`](crate::OutputOptions).
pub const DEFAULT_INDENT: usize = 2;

/// Deepest container nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

/// Root path of a parsed document.
pub const ROOT_PATH: &str = ".";
