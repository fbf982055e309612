use crate::largetext::LargeText;

/// Exact source position of the most recently read character.
/// `line` and `column` are 1-based, `index` is the 0-based absolute
/// character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    line: usize,
    column: usize,
    read: usize,
    line_start: bool,
}

/// Uniform character stream over one or more text chunks.
///
/// In line-separated mode a synthetic `'\n'` is produced at every chunk
/// boundary; otherwise chunks concatenate with no implied separator
/// (large-object paging). A single character of pushback is supported,
/// restoring the position bookkeeping exactly.
pub struct CharReader<'a> {
    chunks: Vec<&'a str>,
    line_separated: bool,
    chunk: usize,
    offset: usize,
    pending_break: bool,
    cur: Cursor,
    prev: Cursor,
    pushback: Option<char>,
}

impl<'a> CharReader<'a> {
    pub fn from_str(source: &'a str) -> Self {
        Self::from_chunks(vec![source], false)
    }

    pub fn from_lines(lines: &'a [String]) -> Self {
        Self::from_chunks(lines.iter().map(String::as_str).collect(), true)
    }

    pub fn from_largetext(text: &'a LargeText) -> Self {
        Self::from_chunks(text.pages().collect(), false)
    }

    pub fn from_chunks(chunks: Vec<&'a str>, line_separated: bool) -> Self {
        let start = Cursor {
            line: 1,
            column: 0,
            read: 0,
            line_start: false,
        };
        Self {
            chunks,
            line_separated,
            chunk: 0,
            offset: 0,
            pending_break: false,
            cur: start,
            prev: start,
            pushback: None,
        }
    }

    /// Advances one character; `None` at the end of all chunks.
    pub fn read(&mut self) -> Option<char> {
        if let Some(ch) = self.pushback.take() {
            std::mem::swap(&mut self.cur, &mut self.prev);
            return Some(ch);
        }
        let ch = self.next_source_char()?;
        self.prev = self.cur;
        if self.cur.line_start {
            self.cur.line += 1;
            self.cur.column = 1;
        } else {
            self.cur.column += 1;
        }
        self.cur.line_start = ch == '\n';
        self.cur.read += 1;
        Some(ch)
    }

    /// Pushes the most recently read character back; the next `read`
    /// returns it again. Only one character may be pending at a time.
    pub fn unread(&mut self, ch: char) {
        std::mem::swap(&mut self.cur, &mut self.prev);
        self.pushback = Some(ch);
    }

    pub fn peek(&mut self) -> Option<char> {
        let ch = self.read()?;
        self.unread(ch);
        Some(ch)
    }

    /// Skips space, tab, line feed and carriage return.
    pub fn read_non_ws(&mut self) -> Option<char> {
        loop {
            match self.read()? {
                ' ' | '\t' | '\n' | '\r' => continue,
                ch => return Some(ch),
            }
        }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.cur.line,
            column: self.cur.column,
            index: self.cur.read.saturating_sub(1),
        }
    }

    fn next_source_char(&mut self) -> Option<char> {
        loop {
            if self.pending_break {
                self.pending_break = false;
                return Some('\n');
            }
            let chunk = self.chunks.get(self.chunk)?;
            if let Some(ch) = chunk[self.offset..].chars().next() {
                self.offset += ch.len_utf8();
                return Some(ch);
            }
            if self.chunk + 1 >= self.chunks.len() {
                return None;
            }
            self.chunk += 1;
            self.offset = 0;
            if self.line_separated {
                self.pending_break = true;
            }
        }
    }
}
