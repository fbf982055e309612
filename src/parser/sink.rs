use smol_str::SmolStr;

use crate::constants::ROOT_PATH;
use crate::error::Result;
use crate::largetext::LargeText;
use crate::path;
use crate::value::{format_number, Value, ValueTable};
use crate::xml::{escape_text_into, sanitize_tag, Markup};

/// Receives document structure events from the parser.
///
/// The grammar walk is shared; the sink decides what a document turns
/// into. [`crate::parse`] routes events into a value table while
/// [`crate::to_xml`] streams an isomorphic XML document instead.
pub trait DocSink {
    fn begin_object(&mut self) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    fn begin_array(&mut self) -> Result<()>;
    fn end_array(&mut self) -> Result<()>;
    /// Announces the member whose value follows; `end_member` closes it.
    fn begin_member(&mut self, name: &str) -> Result<()>;
    fn end_member(&mut self) -> Result<()>;
    /// Announces the element (1-based) whose value follows.
    fn begin_element(&mut self, index: usize) -> Result<()>;
    fn end_element(&mut self) -> Result<()>;
    fn null(&mut self) -> Result<()>;
    fn boolean(&mut self, value: bool) -> Result<()>;
    fn number(&mut self, value: f64) -> Result<()>;
    fn string(&mut self, value: String) -> Result<()>;
    fn large_string(&mut self, value: LargeText) -> Result<()>;
}

struct Frame {
    path: String,
    members: Vec<SmolStr>,
    count: usize,
}

/// Populates a [`ValueTable`] with flattened paths.
pub(crate) struct TableSink {
    table: ValueTable,
    frames: Vec<Frame>,
    target: String,
}

impl TableSink {
    pub(crate) fn new() -> Self {
        Self {
            table: ValueTable::new(),
            frames: Vec::new(),
            target: ROOT_PATH.to_string(),
        }
    }

    pub(crate) fn into_table(self) -> ValueTable {
        self.table
    }

    fn put(&mut self, value: Value) {
        self.table.insert(self.target.clone(), value);
    }

    fn push_frame(&mut self) {
        self.frames.push(Frame {
            path: self.target.clone(),
            members: Vec::new(),
            count: 0,
        });
    }
}

impl DocSink for TableSink {
    fn begin_object(&mut self) -> Result<()> {
        self.push_frame();
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        if let Some(frame) = self.frames.pop() {
            self.table.insert(frame.path, Value::Object(frame.members));
        }
        Ok(())
    }

    fn begin_array(&mut self) -> Result<()> {
        self.push_frame();
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        if let Some(frame) = self.frames.pop() {
            self.table.insert(frame.path, Value::Array(frame.count));
        }
        Ok(())
    }

    fn begin_member(&mut self, name: &str) -> Result<()> {
        if let Some(frame) = self.frames.last_mut() {
            // Duplicate members overwrite their value but are listed once.
            if !frame.members.iter().any(|member| member == name) {
                frame.members.push(SmolStr::new(name));
            }
            self.target = path::join(&frame.path, name);
        }
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_element(&mut self, index: usize) -> Result<()> {
        if let Some(frame) = self.frames.last_mut() {
            frame.count = index;
            self.target = path::join_index(&frame.path, index);
        }
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn null(&mut self) -> Result<()> {
        self.put(Value::Null);
        Ok(())
    }

    fn boolean(&mut self, value: bool) -> Result<()> {
        self.put(Value::Boolean(value));
        Ok(())
    }

    fn number(&mut self, value: f64) -> Result<()> {
        self.put(Value::Number(value));
        Ok(())
    }

    fn string(&mut self, value: String) -> Result<()> {
        self.put(Value::String(value));
        Ok(())
    }

    fn large_string(&mut self, value: LargeText) -> Result<()> {
        self.put(Value::LargeText(value));
        Ok(())
    }
}

enum TagState {
    Pending,
    Open,
    Done,
}

struct Slot {
    tag: SmolStr,
    state: TagState,
}

/// Streams the isomorphic XML rendition while the grammar walk runs.
///
/// Members become sanitized tags, array elements become `<row>` tags,
/// null becomes a self-closing tag and the whole document is wrapped in
/// `<json>`. Tags are deferred until the member's value arrives so that
/// null can collapse to the self-closing form.
pub(crate) struct XmlSink {
    out: LargeText,
    slots: Vec<Slot>,
}

impl XmlSink {
    pub(crate) fn new() -> Self {
        let mut out = LargeText::new();
        out.push_str("<json>");
        Self {
            out,
            slots: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> Markup {
        self.out.push_str("</json>");
        Markup::from_text(self.out)
    }

    fn open_pending(&mut self) {
        if let Some(slot) = self.slots.last_mut() {
            if matches!(slot.state, TagState::Pending) {
                slot.state = TagState::Open;
                let tag = slot.tag.clone();
                self.out.push('<');
                self.out.push_str(&tag);
                self.out.push('>');
            }
        }
    }

    fn scalar(&mut self, render: impl FnOnce(&mut LargeText)) -> Result<()> {
        match self.slots.last_mut() {
            Some(slot) => {
                let tag = slot.tag.clone();
                slot.state = TagState::Done;
                self.out.push('<');
                self.out.push_str(&tag);
                self.out.push('>');
                render(&mut self.out);
                self.out.push_str("</");
                self.out.push_str(&tag);
                self.out.push('>');
            }
            None => render(&mut self.out),
        }
        Ok(())
    }
}

impl DocSink for XmlSink {
    fn begin_object(&mut self) -> Result<()> {
        self.open_pending();
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_array(&mut self) -> Result<()> {
        self.open_pending();
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_member(&mut self, name: &str) -> Result<()> {
        self.slots.push(Slot {
            tag: sanitize_tag(name),
            state: TagState::Pending,
        });
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        if let Some(slot) = self.slots.pop() {
            if matches!(slot.state, TagState::Open) {
                self.out.push_str("</");
                self.out.push_str(&slot.tag);
                self.out.push('>');
            }
        }
        Ok(())
    }

    fn begin_element(&mut self, _index: usize) -> Result<()> {
        self.slots.push(Slot {
            tag: SmolStr::new_static("row"),
            state: TagState::Pending,
        });
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        self.end_member()
    }

    fn null(&mut self) -> Result<()> {
        if let Some(slot) = self.slots.last_mut() {
            let tag = slot.tag.clone();
            slot.state = TagState::Done;
            self.out.push('<');
            self.out.push_str(&tag);
            self.out.push_str("/>");
        }
        Ok(())
    }

    fn boolean(&mut self, value: bool) -> Result<()> {
        self.scalar(|out| out.push_str(if value { "true" } else { "false" }))
    }

    fn number(&mut self, value: f64) -> Result<()> {
        self.scalar(|out| out.push_str(&format_number(value)))
    }

    fn string(&mut self, value: String) -> Result<()> {
        self.scalar(|out| escape_text_into(out, &value))
    }

    fn large_string(&mut self, value: LargeText) -> Result<()> {
        self.scalar(|out| {
            for page in value.pages() {
                escape_text_into(out, page);
            }
        })
    }
}
