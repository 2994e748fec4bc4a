// src/markup/mod.rs
//! Push-based table extraction.
//!
//! Both parsers here consume [`Token`](crate::core::Token)s one at a time and
//! keep a single enumerated state. They never build a tree: text is appended
//! to whichever accumulator the current state names, and a row is emitted when
//! its closing tag arrives.
//!
//! - [`events`]: tracking-history tables (`<tbody>` → `<tr>` → `<td data-label>`).
//! - [`store`]: branch detail fragments (address, contact and hours tables).

pub mod events;
pub mod store;

pub use events::{parse_rows, Column, EventTable, RawRow, Rows};
pub use store::{parse_store, StoreSections};

use crate::core::html::decode_entity;

/// Append a decoded entity, or the literal reference if the name is unknown.
pub(crate) fn push_entity(buf: &mut String, name: &str) {
    match decode_entity(name) {
        Some(ch) => buf.push(ch),
        None => {
            buf.push('&');
            buf.push_str(name);
            buf.push(';');
        }
    }
}
