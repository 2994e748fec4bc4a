// src/markup/events.rs
//! Event-history table scanner.
//!
//! States and transitions:
//!
//! ```text
//! SeekTable        --<tbody>-->              InTbody
//! InTbody          --<tr>-->                 InRow          (accumulators reset)
//! InRow            --<td data-label=L>-->    InLabeledCell  (L recognized)
//! InLabeledCell    --text/entity-->          InLabeledCell  (append to column)
//! InLabeledCell    --</td>-->                InRow
//! InRow            --</tr>-->                InTbody        (row emitted)
//! InTbody          --</tbody>-->             SeekTable
//! any other state  --</tbody>-->             error
//! ```
//!
//! Everything else is ignored. Cell contents are not interpreted here.

use std::fmt;

use crate::core::sanitize::normalize_ws;
use crate::core::{Token, Tokens};
use crate::error::MarkupError;

use super::push_entity;

/// Which accumulator a recognized cell label feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    DateTime,
    Status,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekTable,
    InTbody,
    InRow,
    InLabeledCell(Column),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::SeekTable => f.write_str("outside table body"),
            State::InTbody => f.write_str("in table body"),
            State::InRow => f.write_str("in row"),
            State::InLabeledCell(c) => write!(f, "in {:?} cell", c),
        }
    }
}

/// One uninterpreted history row. Whitespace is collapsed, entities decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub date_time: String,
    pub status: String,
    pub location: String,
}

impl RawRow {
    fn column_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::DateTime => &mut self.date_time,
            Column::Status => &mut self.status,
            Column::Location => &mut self.location,
        }
    }

    fn normalized(self) -> Self {
        Self {
            date_time: normalize_ws(&self.date_time),
            status: normalize_ws(&self.status),
            location: normalize_ws(&self.location),
        }
    }
}

/// Single-pass output of [`EventTable::finish`]. Rows come in document order.
#[derive(Debug)]
pub struct Rows(std::vec::IntoIter<RawRow>);

impl Iterator for Rows {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Rows {}

pub struct EventTable<'l> {
    labels: &'l [(&'l str, Column)],
    state: State,
    row: RawRow,
    rows: Vec<RawRow>,
}

impl<'l> EventTable<'l> {
    /// `labels` maps `data-label` values (compared case-insensitively after
    /// trimming) to columns. Cells with any other label are skipped.
    pub fn new(labels: &'l [(&'l str, Column)]) -> Self {
        Self { labels, state: State::SeekTable, row: RawRow::default(), rows: Vec::new() }
    }

    fn column_for(&self, label: &str) -> Option<Column> {
        let label = label.trim();
        self.labels
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|&(_, c)| c)
    }

    pub fn push(&mut self, token: &Token<'_>) -> Result<(), MarkupError> {
        match (self.state, token) {
            (State::SeekTable, t) if t.is_start("tbody") => self.state = State::InTbody,
            (State::InTbody, t) if t.is_start("tr") => {
                self.row = RawRow::default();
                self.state = State::InRow;
            }
            (State::InRow, t) if t.is_start("td") => {
                if let Some(column) = t.attr("data-label").and_then(|l| self.column_for(l)) {
                    self.state = State::InLabeledCell(column);
                }
            }
            (State::InLabeledCell(c), Token::Text(text)) => self.row.column_mut(c).push_str(text),
            (State::InLabeledCell(c), Token::Entity(name)) => push_entity(self.row.column_mut(c), name),
            // line breaks separate words
            (State::InLabeledCell(c), Token::Start { name, .. } | Token::SelfClosing { name, .. })
                if name == "br" =>
            {
                self.row.column_mut(c).push(' ')
            }
            (State::InLabeledCell(_), t) if t.is_end("td") => self.state = State::InRow,
            (State::InRow, t) if t.is_end("tr") => {
                let row = std::mem::take(&mut self.row).normalized();
                self.rows.push(row);
                self.state = State::InTbody;
            }
            (State::InTbody, t) if t.is_end("tbody") => self.state = State::SeekTable,
            (state, t) if t.is_end("tbody") => {
                return Err(MarkupError::Unbalanced { tag: "tbody", state: state.to_string() });
            }
            _ => {}
        }
        Ok(())
    }

    pub fn finish(self) -> Rows {
        Rows(self.rows.into_iter())
    }
}

/// Scan a whole fragment. No `<tbody>` means no rows, not an error.
pub fn parse_rows(html: &str, labels: &[(&str, Column)]) -> Result<Rows, MarkupError> {
    let mut table = EventTable::new(labels);
    for token in Tokens::new(html) {
        table.push(&token)?;
    }
    Ok(table.finish())
}
