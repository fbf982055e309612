use std::fmt;

use crate::constants::LARGE_TEXT_PAGE;

/// Growable paged character store for values too large to keep in one
/// bounded buffer.
///
/// Pages are filled greedily, so every page except the last holds
/// exactly [`LARGE_TEXT_PAGE`] characters; equal contents therefore
/// always have equal page layouts. Storage is released on drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LargeText {
    pages: Vec<String>,
    tail_chars: usize,
    len_chars: usize,
}

impl LargeText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.push_str(ch.encode_utf8(&mut buf));
    }

    pub fn push_str(&mut self, text: &str) {
        let mut rest = text;
        while !rest.is_empty() {
            if self.pages.is_empty() || self.tail_chars == LARGE_TEXT_PAGE {
                self.pages.push(String::new());
                self.tail_chars = 0;
            }
            let (head, tail, taken) = split_at_chars(rest, LARGE_TEXT_PAGE - self.tail_chars);
            if let Some(page) = self.pages.last_mut() {
                page.push_str(head);
            }
            self.tail_chars += taken;
            self.len_chars += taken;
            rest = tail;
        }
    }

    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars == 0
    }

    /// Chunked view of the content, each slice bounded by
    /// [`LARGE_TEXT_PAGE`] characters.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(String::as_str)
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.pages.iter().flat_map(|page| page.chars())
    }

    /// Releases all storage, leaving an empty buffer behind.
    pub fn clear(&mut self) {
        self.pages = Vec::new();
        self.tail_chars = 0;
        self.len_chars = 0;
    }
}

/// Splits `text` after at most `max_chars` characters, returning both
/// halves and the number of characters taken.
pub(crate) fn split_at_chars(text: &str, max_chars: usize) -> (&str, &str, usize) {
    let mut taken = 0;
    for (offset, _) in text.char_indices() {
        if taken == max_chars {
            let (head, tail) = text.split_at(offset);
            return (head, tail, taken);
        }
        taken += 1;
    }
    (text, "", taken)
}

impl From<&str> for LargeText {
    fn from(text: &str) -> Self {
        let mut out = Self::new();
        out.push_str(text);
        out
    }
}

impl From<String> for LargeText {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl fmt::Display for LargeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in self.pages() {
            f.write_str(page)?;
        }
        Ok(())
    }
}
