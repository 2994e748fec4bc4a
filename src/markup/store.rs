// src/markup/store.rs
//! Branch detail fragment scanner.
//!
//! Same shape as the history scanner, one level up: a fragment holds up to
//! three `<table class="...">` sections (`address`, `contact`, `hours`), each
//! made of rows and cells. Inside address and contact cells, bold text
//! (`<b>`, `<strong>`) is a heading: it is swallowed from the cell value and,
//! in the contact section, selects the field the row feeds.
//!
//! Hours rows are flattened for the opening-hours grammar: the first cell is
//! the day label, every further cell becomes a `#`-prefixed range, and rows
//! are later joined with `|`.

use std::fmt;

use crate::core::sanitize::{label_key, non_empty, normalize_ws};
use crate::core::{Token, Tokens};
use crate::error::MarkupError;

use super::push_entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Address,
    Contact,
    Hours,
}

impl Section {
    fn from_class(class: &str) -> Option<Self> {
        class.split_ascii_whitespace().find_map(|c| match c {
            "address" => Some(Section::Address),
            "contact" => Some(Section::Contact),
            "hours" => Some(Section::Hours),
            _ => None,
        })
    }

    fn masks_headings(self) -> bool {
        !matches!(self, Section::Hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekSection,
    InSection(Section),
    InRow(Section),
    InCell(Section),
    InHeading(Section),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::SeekSection => f.write_str("outside any section"),
            State::InSection(s) => write!(f, "in {:?} section", s),
            State::InRow(s) => write!(f, "in {:?} row", s),
            State::InCell(s) => write!(f, "in {:?} cell", s),
            State::InHeading(s) => write!(f, "in {:?} heading", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactField {
    Phone,
    Fax,
    Email,
}

fn contact_field(heading: &str) -> Option<ContactField> {
    match label_key(heading).as_str() {
        "phone" | "telefon" | "tel" | "tel." => Some(ContactField::Phone),
        "fax" | "telefax" => Some(ContactField::Fax),
        "e-mail" | "email" | "mail" => Some(ContactField::Email),
        _ => None,
    }
}

/// Raw section contents, whitespace collapsed and entities decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSections {
    /// Non-empty address rows in document order.
    pub address_lines: Vec<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    /// `Mo. - Fr.: #08:00 - 12:00#13:00 - 18:00`, one entry per row.
    pub hours_rows: Vec<String>,
}

impl StoreSections {
    /// Rows joined for the opening-hours grammar; `None` without an hours section.
    pub fn hours_text(&self) -> Option<String> {
        if self.hours_rows.is_empty() {
            None
        } else {
            Some(self.hours_rows.join("|"))
        }
    }
}

struct StoreScanner {
    state: State,
    heading: String,
    cell: String,
    cells: Vec<String>,
    out: StoreSections,
}

impl StoreScanner {
    fn new() -> Self {
        Self {
            state: State::SeekSection,
            heading: s!(),
            cell: s!(),
            cells: Vec::new(),
            out: StoreSections::default(),
        }
    }

    fn push(&mut self, token: &Token<'_>) -> Result<(), MarkupError> {
        use State::*;
        match (self.state, token) {
            (SeekSection, t) if t.is_start("table") => {
                if let Some(section) = t.attr("class").and_then(Section::from_class) {
                    self.state = InSection(section);
                }
            }
            (InSection(s), t) if t.is_start("tr") => {
                self.heading.clear();
                self.cells.clear();
                self.state = InRow(s);
            }
            (InRow(s), t) if t.is_start("td") || t.is_start("th") => {
                self.cell.clear();
                self.state = InCell(s);
            }
            (InCell(s), t) if s.masks_headings() && (t.is_start("b") || t.is_start("strong")) => {
                self.state = InHeading(s);
            }
            (InHeading(s), t) if t.is_end("b") || t.is_end("strong") => self.state = InCell(s),
            (InCell(_), Token::Text(text)) => self.cell.push_str(text),
            (InCell(_), Token::Entity(name)) => push_entity(&mut self.cell, name),
            (InHeading(_), Token::Text(text)) => self.heading.push_str(text),
            (InHeading(_), Token::Entity(name)) => push_entity(&mut self.heading, name),
            (InCell(_), Token::Start { name, .. } | Token::SelfClosing { name, .. }) if name == "br" => {
                self.cell.push(' ')
            }
            (InCell(s), t) if t.is_end("td") || t.is_end("th") => {
                self.cells.push(normalize_ws(&self.cell));
                self.state = InRow(s);
            }
            (InRow(s), t) if t.is_end("tr") => {
                self.emit_row(s);
                self.state = InSection(s);
            }
            (InSection(_), t) if t.is_end("table") => self.state = SeekSection,
            (InRow(_) | InCell(_) | InHeading(_), t) if t.is_end("table") => {
                return Err(MarkupError::Unbalanced { tag: "table", state: self.state.to_string() });
            }
            _ => {}
        }
        Ok(())
    }

    fn emit_row(&mut self, section: Section) {
        let cells = std::mem::take(&mut self.cells);
        match section {
            Section::Address => {
                if let Some(line) = non_empty(&cells.join(" ")) {
                    self.out.address_lines.push(line);
                }
            }
            Section::Contact => {
                let value = non_empty(&cells.join(" "));
                let slot = match contact_field(&self.heading) {
                    Some(ContactField::Phone) => &mut self.out.phone,
                    Some(ContactField::Fax) => &mut self.out.fax,
                    Some(ContactField::Email) => &mut self.out.email,
                    None => return,
                };
                if slot.is_none() {
                    *slot = value;
                }
            }
            Section::Hours => {
                let mut cells = cells.into_iter().filter(|c| !c.is_empty());
                let Some(day) = cells.next() else { return };
                let mut row = day;
                for range in cells {
                    row.push('#');
                    row.push_str(&range);
                }
                self.out.hours_rows.push(row);
            }
        }
    }
}

pub fn parse_store(html: &str) -> Result<StoreSections, MarkupError> {
    let mut scanner = StoreScanner::new();
    for token in Tokens::new(html) {
        scanner.push(&token)?;
    }
    Ok(scanner.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRANCH: &str = r#"
<div class="branch">
  <table class="address">
    <tr><td><b>Adresse</b></td></tr>
    <tr><td>Postfiliale 1010</td></tr>
    <tr><td>Fleischmarkt 19</td></tr>
    <tr><td>1010 Wien</td></tr>
  </table>
  <table class="contact">
    <tr><td><strong>Telefon:</strong> +43 577 677 1010</td></tr>
    <tr><td><b>Fax:</b></td><td>+43 577 677 1019</td></tr>
    <tr><td><b>E-Mail:</b> filiale&#64;post.at</td></tr>
    <tr><td><b>Web:</b> post.at</td></tr>
  </table>
  <table class="hours">
    <tr><td>Mo. - Fr.:</td><td>08:00 - 12:00</td><td>13:00 - 18:00</td></tr>
    <tr><td>Sa.:</td><td>--:-- - --:--</td></tr>
  </table>
</div>"#;

    #[test]
    fn splits_sections() {
        let s = parse_store(BRANCH).unwrap();
        assert_eq!(s.address_lines, vec!["Postfiliale 1010", "Fleischmarkt 19", "1010 Wien"]);
        assert_eq!(s.phone.as_deref(), Some("+43 577 677 1010"));
        assert_eq!(s.fax.as_deref(), Some("+43 577 677 1019"));
        assert_eq!(s.email.as_deref(), Some("filiale@post.at"));
        assert_eq!(
            s.hours_text().as_deref(),
            Some("Mo. - Fr.:#08:00 - 12:00#13:00 - 18:00|Sa.:#--:-- - --:--")
        );
    }

    #[test]
    fn unclassed_tables_are_ignored() {
        let s = parse_store("<table><tr><td>x</td></tr></table>").unwrap();
        assert_eq!(s, StoreSections::default());
        assert_eq!(s.hours_text(), None);
    }

    #[test]
    fn table_closed_inside_row_is_fatal() {
        let err = parse_store(r#"<table class="hours"><tr><td>Mo.:</table>"#).unwrap_err();
        assert!(matches!(err, MarkupError::Unbalanced { tag: "table", .. }));
    }
}
