// src/classify/mod.rs
//! # Event classification
//!
//! One module per carrier, each owning a declarative vocabulary table that
//! maps the carrier's raw status (numeric code or status phrase) to one or
//! more [`Emit`] descriptors. A descriptor becomes a [`ParcelEvent`] once the
//! record's timestamp and context (location, recipient, store) are known.
//!
//! ## Totality
//! Every lookup has a single default arm: a status missing from the table
//! yields exactly one [`EventKind::Unclassified`] event carrying the record's
//! timestamp. Vocabulary gaps never produce errors. Only structural problems
//! (a record without a usable timestamp, a record of the wrong shape) do.
//!
//! ## Order
//! Classifiers emit in the carrier's own record order. Reversal of
//! newest-first carriers and the final chronological sort happen in the
//! adapter (`carrier::Shipment::events`).

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use crate::carrier::Carrier;
use crate::error::TrackError;
use crate::markup::RawRow;
use crate::model::{EventKind, Location, Notification, ParcelEvent, Store};

pub mod dhl;
pub mod dpd;
pub mod gls;
pub mod hermes;
pub mod post_at;

/// How a table key matches a status phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    Exact(&'static str),
    /// Matches any status starting with the text; the tail is handed back.
    Prefix(&'static str),
}

impl Phrase {
    fn matches<'s>(&self, status: &'s str) -> Option<&'s str> {
        match *self {
            Phrase::Exact(p) => (status == p).then_some(""),
            Phrase::Prefix(p) => status.strip_prefix(p),
        }
    }
}

/// First table entry whose phrase matches, plus the unmatched tail of the status.
pub fn lookup<'t, 's, T>(table: &'t [(Phrase, T)], status: &'s str) -> Option<(&'t T, &'s str)> {
    table
        .iter()
        .find_map(|(phrase, value)| phrase.matches(status).map(|rest| (value, rest)))
}

/// Event-constructor descriptor: which kind to build, not yet bound to a
/// timestamp or a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Unclassified,
    DataReceived,
    Cancelled,
    Redirected,
    LabelPrinted,
    Sorted,
    InboundSorted,
    OutboundSorted,
    ManualSorted,
    Stored,
    Posted,
    PickedUp,
    InDelivery,
    Delivered,
    DeliveredToNeighbour,
    DeliveredDropOff,
    DeliveryFailed,
    RecipientUnavailable,
    WrongAddress,
    DeliveryRefused,
    Notified(Notification),
    StoreDropOff,
    StorePickup,
    StoreNotCollected,
    Returned,
}

/// Per-record facts a descriptor may draw on.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    pub location: Option<Location>,
    pub recipient: Option<String>,
    pub store: Option<Store>,
}

impl EventContext {
    pub fn at(location: Option<Location>) -> Self {
        Self { location, ..Self::default() }
    }
}

impl Emit {
    pub fn build(self, when: NaiveDateTime, ctx: &EventContext) -> ParcelEvent {
        let location = ctx.location.clone();
        let kind = match self {
            Emit::Unclassified => EventKind::Unclassified,
            Emit::DataReceived => EventKind::DataReceived,
            Emit::Cancelled => EventKind::Cancelled,
            Emit::Redirected => EventKind::Redirected,
            Emit::LabelPrinted => EventKind::LabelPrinted { location },
            Emit::Sorted => EventKind::Sorted { location },
            Emit::InboundSorted => EventKind::InboundSorted { location },
            Emit::OutboundSorted => EventKind::OutboundSorted { location },
            Emit::ManualSorted => EventKind::ManualSorted { location },
            Emit::Stored => EventKind::Stored { location },
            Emit::Posted => EventKind::Posted { location },
            Emit::PickedUp => EventKind::PickedUp { location },
            Emit::InDelivery => EventKind::InDelivery { location },
            Emit::Delivered => EventKind::Delivered { location, recipient: ctx.recipient.clone() },
            Emit::DeliveredToNeighbour => {
                EventKind::DeliveredToNeighbour { location, recipient: ctx.recipient.clone() }
            }
            Emit::DeliveredDropOff => EventKind::DeliveredDropOff { location },
            Emit::DeliveryFailed => EventKind::DeliveryFailed { location },
            Emit::RecipientUnavailable => EventKind::RecipientUnavailable { location },
            Emit::WrongAddress => EventKind::WrongAddress { location },
            Emit::DeliveryRefused => EventKind::DeliveryRefused { location },
            Emit::Notified(notification) => EventKind::RecipientNotified { location, notification },
            Emit::StoreDropOff => EventKind::StoreDropOff { location, store: ctx.store.clone() },
            Emit::StorePickup => EventKind::StorePickup { location },
            Emit::StoreNotCollected => EventKind::StoreNotCollected { location },
            Emit::Returned => EventKind::Returned { location },
        };
        ParcelEvent::new(when, kind)
    }
}

/// Build every descriptor against the same timestamp and context.
pub fn emit_all(emits: &[Emit], when: NaiveDateTime, ctx: &EventContext) -> Vec<ParcelEvent> {
    emits.iter().map(|e| e.build(when, ctx)).collect()
}

/// Resolves a store id to its details via a secondary fetch.
pub trait StoreLookup {
    fn lookup_store(&self, carrier: Carrier, id: &str) -> Option<Store>;
}

/// For classifying without any secondary fetches.
pub struct NoStores;

impl StoreLookup for NoStores {
    fn lookup_store(&self, _carrier: Carrier, _id: &str) -> Option<Store> {
        None
    }
}

/// One raw history record as the carrier delivered it.
#[derive(Debug, Clone, Copy)]
pub enum RawRecord<'a> {
    Row(&'a RawRow),
    Json(&'a Value),
}

/// Shipment-level facts some carriers attach to individual events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shared<'a> {
    pub recipient: Option<&'a str>,
}

/// Map one raw record to zero or more canonical events.
pub fn classify(
    carrier: Carrier,
    record: RawRecord<'_>,
    shared: Shared<'_>,
    stores: &dyn StoreLookup,
) -> Result<Vec<ParcelEvent>, TrackError> {
    match (carrier, record) {
        (Carrier::Dhl, RawRecord::Row(row)) => dhl::classify_row(row),
        (Carrier::PostAt, RawRecord::Row(row)) => post_at::classify_row(row, stores),
        (Carrier::Dpd, RawRecord::Json(scan)) => dpd::classify_scan(scan, shared.recipient, stores),
        (Carrier::Gls, RawRecord::Json(entry)) => gls::classify_entry(entry),
        (Carrier::Hermes, RawRecord::Json(entry)) => hermes::classify_entry(entry),
        (carrier, _) => Err(TrackError::malformed(carrier, "record of the wrong shape")),
    }
}

fn dotted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})[,\s]+(\d{1,2}):(\d{2})(?::(\d{2}))?").unwrap()
    })
}

/// First `dd.mm.yyyy HH:MM[:SS]` in `s`, ignoring weekday prefixes and unit
/// suffixes (`"Sa., 01.02.2020 10:00 h"`).
pub fn parse_dotted_datetime(s: &str) -> Option<NaiveDateTime> {
    let caps = dotted_re().captures(s)?;
    let num = |i: usize| caps.get(i).map_or(Some(0), |m| m.as_str().parse::<u32>().ok());
    let year = caps[3].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, num(2)?, num(1)?)?.and_hms_opt(num(4)?, num(5)?, num(6)?)
}

/// String field of a JSON object, trimmed; `None` when absent, null or not a string.
pub(crate) fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str).map(str::trim)
}

pub(crate) fn when_or_malformed(
    carrier: Carrier,
    when: Option<NaiveDateTime>,
    raw: &str,
) -> Result<NaiveDateTime, TrackError> {
    when.ok_or_else(|| TrackError::malformed(carrier, format!("unreadable timestamp {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(Phrase, Emit)] = &[
        (Phrase::Exact("Delivered"), Emit::Delivered),
        (Phrase::Prefix("Sorted at "), Emit::Sorted),
    ];

    #[test]
    fn exact_and_prefix_lookup() {
        assert_eq!(lookup(TABLE, "Delivered"), Some((&Emit::Delivered, "")));
        assert_eq!(lookup(TABLE, "Sorted at Graz"), Some((&Emit::Sorted, "Graz")));
        assert_eq!(lookup(TABLE, "Delivered today"), None);
    }

    #[test]
    fn dotted_timestamps() {
        let t = parse_dotted_datetime("Sa., 01.02.2020 10:05 h").unwrap();
        assert_eq!(t.to_string(), "2020-02-01 10:05:00");
        let t = parse_dotted_datetime("03.11.2021 07:08:09").unwrap();
        assert_eq!(t.to_string(), "2021-11-03 07:08:09");
        assert!(parse_dotted_datetime("31.02.2020 10:00").is_none());
        assert!(parse_dotted_datetime("yesterday").is_none());
    }

    #[test]
    fn wrong_record_shape_is_structural() {
        let v = serde_json::json!({});
        let err = classify(Carrier::Dhl, RawRecord::Json(&v), Shared::default(), &NoStores).unwrap_err();
        assert!(matches!(err, TrackError::Malformed { .. }));
    }
}
