//! Row-set and hypermedia emission on top of the core writer.

use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::rowset::{Cell, Link, RowSet};
use crate::xml::rowset_to_markup;

use super::{Frame, JsonWriter, Sink};

impl<S: Sink> JsonWriter<S> {
    /// Writes a row set as an array of row objects.
    ///
    /// Columns serialize by declared type; null cells are omitted and a
    /// varchar cell reading `TRUE`/`FALSE` becomes a boolean. A row set
    /// with a structured column cannot be streamed per column and is
    /// serialized through its markup rendition instead.
    pub fn write_rowset(&mut self, name: &str, rows: &RowSet) -> Result<()> {
        self.put_rowset(Some(name), rows)
    }

    pub fn append_rowset(&mut self, rows: &RowSet) -> Result<()> {
        self.put_rowset(None, rows)
    }

    /// Writes one hypermedia link object as an array element.
    pub fn write_link(&mut self, link: &Link) -> Result<()> {
        self.open_object()?;
        self.write_string("rel", &link.rel)?;
        self.write_string("href", &link.href)?;
        if let Some(templated) = link.templated {
            self.write_boolean("templated", templated)?;
        }
        if let Some(media_type) = &link.media_type {
            self.write_string("mediaType", media_type)?;
        }
        if let Some(method) = &link.method {
            self.write_string("method", method)?;
        }
        if let Some(profile) = &link.profile {
            self.write_string("profile", profile)?;
        }
        self.close_object()
    }

    /// Writes a `links` member holding the given link objects.
    pub fn write_links(&mut self, links: &[Link]) -> Result<()> {
        self.open_array_named("links")?;
        for link in links {
            self.write_link(link)?;
        }
        self.close_array()
    }

    /// Writes an `items` member with one object per row, each carrying
    /// a `links` array built by substituting that row's column values
    /// into the link templates.
    ///
    /// Row sets with structured columns fall back to the markup
    /// rendition, which cannot substitute per-row values; combining
    /// such a row set with links is therefore rejected.
    pub fn write_items(&mut self, rows: &RowSet, links: &[Link]) -> Result<()> {
        if rows.has_structured_column() {
            if !links.is_empty() {
                return Err(Error::writer_state(
                    "row sets with structured columns cannot carry links",
                ));
            }
            let value = rowset_to_markup(rows).to_value()?;
            return self.write_value("items", &value);
        }
        let bindings = placeholder_bindings(rows, links);
        self.open_array_named("items")?;
        for row in rows.rows() {
            self.open_object()?;
            self.put_row_members(rows, row)?;
            if !links.is_empty() {
                self.open_array_named("links")?;
                for link in links {
                    let resolved = substitute(link, &bindings, row);
                    self.write_link(&resolved)?;
                }
                self.close_array()?;
            }
            self.close_object()?;
        }
        self.close_array()
    }

    fn put_rowset(&mut self, name: Option<&str>, rows: &RowSet) -> Result<()> {
        if rows.has_structured_column() {
            let value = rowset_to_markup(rows).to_value()?;
            return self.put_value(name, &value);
        }
        self.open(name, Frame::ArrayOpened)?;
        for row in rows.rows() {
            self.open_object()?;
            self.put_row_members(rows, row)?;
            self.close_object()?;
        }
        self.close_array()
    }

    fn put_row_members(&mut self, rows: &RowSet, row: &[Cell]) -> Result<()> {
        for (column, cell) in rows.columns().iter().zip(row) {
            let name = column.name.as_str();
            match cell {
                Cell::Null => {}
                Cell::Varchar(text) => {
                    if text.eq_ignore_ascii_case("true") {
                        self.write_boolean(name, true)?;
                    } else if text.eq_ignore_ascii_case("false") {
                        self.write_boolean(name, false)?;
                    } else {
                        self.write_string(name, text)?;
                    }
                }
                Cell::Number(value) => self.write_number(name, *value)?,
                Cell::Date(value) => self.write_datetime(name, *value)?,
                Cell::Timestamp(value) => self.write_timestamp_tz(name, *value)?,
                Cell::Clob(text) => self.write_largetext(name, text)?,
                Cell::Structured(_) => {
                    return Err(Error::writer_state(
                        "structured cell outside the markup serialization path",
                    ))
                }
            }
        }
        Ok(())
    }
}

/// Template placeholders resolved to column positions, scanned once
/// for the whole call.
fn placeholder_bindings(rows: &RowSet, links: &[Link]) -> Vec<(SmolStr, Option<usize>)> {
    let mut bindings: Vec<(SmolStr, Option<usize>)> = Vec::new();
    for link in links {
        for placeholder in link.placeholders() {
            if !bindings.iter().any(|(name, _)| *name == placeholder) {
                let column = rows.column_index(&placeholder);
                bindings.push((placeholder, column));
            }
        }
    }
    bindings
}

fn substitute(link: &Link, bindings: &[(SmolStr, Option<usize>)], row: &[Cell]) -> Link {
    let mut resolved = link.clone();
    for (name, column) in bindings {
        let marker = format!("#{name}#");
        if !resolved.href.contains(&marker) {
            continue;
        }
        let replacement = column
            .and_then(|index| row.get(index))
            .and_then(Cell::substitution_text)
            .unwrap_or_default();
        resolved.href = resolved.href.replace(&marker, &replacement);
    }
    resolved
}
