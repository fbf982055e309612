use memchr::memchr_iter;
use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::largetext::LargeText;
use crate::temporal::{DateTime, Timestamp};
use crate::value::format_number;
use crate::xml::Markup;

/// Declared type of a row-set column.
///
/// [`ColumnType::Structured`] marks nested markup-valued columns;
/// their presence forces the markup-based serialization path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar,
    Number,
    Date,
    Timestamp,
    Clob,
    Structured,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: SmolStr,
    pub column_type: ColumnType,
}

/// One column value of one row.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Varchar(String),
    Number(f64),
    Date(DateTime),
    Timestamp(Timestamp),
    Clob(LargeText),
    Structured(Markup),
}

impl Cell {
    /// Raw textual form used for link placeholder substitution.
    pub(crate) fn substitution_text(&self) -> Option<String> {
        match self {
            Cell::Null | Cell::Structured(_) => None,
            Cell::Varchar(text) => Some(text.clone()),
            Cell::Number(value) => Some(format_number(*value)),
            Cell::Date(value) => Some(value.to_string()),
            Cell::Timestamp(value) => Some(value.to_string()),
            Cell::Clob(text) => Some(text.to_string()),
        }
    }
}

/// Tabular data fed to the writer's row-set operations.
///
/// Column metadata is declared up front; rows must match the declared
/// arity. Member names in the generated output keep the declared case.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl AsRef<str>, column_type: ColumnType) -> Self {
        self.columns.push(Column {
            name: SmolStr::new(name.as_ref()),
            column_type,
        });
        self
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(Error::writer_state(format!(
                "row has {} cells but the row set declares {} columns",
                cells.len(),
                self.columns.len()
            )));
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_structured_column(&self) -> bool {
        self.columns
            .iter()
            .any(|column| column.column_type == ColumnType::Structured)
    }

    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

/// Hypermedia link descriptor attached to row-set output.
///
/// The `href` may carry `#column#` placeholders that are substituted
/// per row from that row's column values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub rel: String,
    pub templated: Option<bool>,
    pub media_type: Option<String>,
    pub method: Option<String>,
    pub profile: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            templated: None,
            media_type: None,
            method: None,
            profile: None,
        }
    }

    pub fn with_templated(mut self, templated: bool) -> Self {
        self.templated = Some(templated);
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Placeholder names referenced by `href`, taking `#` markers
    /// pairwise.
    pub(crate) fn placeholders(&self) -> Vec<SmolStr> {
        let bytes = self.href.as_bytes();
        let marks: Vec<usize> = memchr_iter(b'#', bytes).collect();
        let mut names = Vec::new();
        for pair in marks.chunks_exact(2) {
            let inner = &self.href[pair[0] + 1..pair[1]];
            if !inner.is_empty() {
                names.push(SmolStr::new(inner));
            }
        }
        names
    }
}
