// src/classify/post_at.rs
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::carrier::Carrier;
use crate::error::TrackError;
use crate::markup::{Column, RawRow};
use crate::model::{Location, Notification, ParcelEvent};

use super::{
    emit_all, lookup, parse_dotted_datetime, when_or_malformed, Emit, EventContext, Phrase, StoreLookup,
};

pub const LABELS: &[(&str, Column)] = &[
    ("Datum", Column::DateTime),
    ("Date", Column::DateTime),
    ("Status", Column::Status),
    ("Ort", Column::Location),
    ("Location", Column::Location),
];

/// Status prefix announcing a branch pickup; the tail is the branch number.
pub const BRANCH_PREFIX: &str = "Item ready for collection at branch ";

pub const VOCABULARY: &[(Phrase, &[Emit])] = &[
    (Phrase::Exact("Item information received electronically"), &[Emit::DataReceived]),
    (Phrase::Exact("Parcel label printed"), &[Emit::LabelPrinted]),
    (Phrase::Exact("Item accepted at the post office"), &[Emit::Posted]),
    (Phrase::Exact("Item picked up from sender"), &[Emit::PickedUp]),
    (Phrase::Exact("Item sorted"), &[Emit::Sorted]),
    (Phrase::Exact("Item arrived at the delivery base"), &[Emit::InboundSorted]),
    (Phrase::Exact("Item left the sorting centre"), &[Emit::OutboundSorted]),
    (Phrase::Exact("Item sorted manually"), &[Emit::ManualSorted]),
    (Phrase::Exact("Item stored"), &[Emit::Stored]),
    (Phrase::Exact("Item out for delivery"), &[Emit::InDelivery]),
    (Phrase::Exact("Item delivered"), &[Emit::Delivered]),
    (Phrase::Exact("Item delivered to neighbour"), &[Emit::DeliveredToNeighbour]),
    (Phrase::Exact("Item deposited at the agreed place"), &[Emit::DeliveredDropOff]),
    (Phrase::Exact("Delivery not possible"), &[Emit::DeliveryFailed]),
    (
        Phrase::Exact("Recipient not present, notification card left"),
        &[Emit::RecipientUnavailable, Emit::Notified(Notification::Card)],
    ),
    (Phrase::Exact("Recipient address unknown"), &[Emit::WrongAddress]),
    (Phrase::Exact("Acceptance refused"), &[Emit::DeliveryRefused]),
    (Phrase::Prefix(BRANCH_PREFIX), &[Emit::StoreDropOff]),
    (Phrase::Exact("Item collected at branch"), &[Emit::StorePickup]),
    (Phrase::Exact("Storage period expired"), &[Emit::StoreNotCollected]),
    (Phrase::Exact("Item returned to sender"), &[Emit::Returned]),
    (Phrase::Exact("Delivery redirected at recipient's request"), &[Emit::Redirected]),
    (Phrase::Exact("Item cancelled"), &[Emit::Cancelled]),
];

fn postcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})\s+(.+)$").unwrap())
}

/// `"1010 Wien"` → Austrian postcode and city; anything else is a bare place name.
pub fn parse_place(raw: &str) -> Option<Location> {
    match raw.trim() {
        "" | "--" => None,
        s => Some(match postcode_re().captures(s) {
            Some(caps) => Location::city(&caps[2]).with_postcode(&caps[1]).with_country_code("AT"),
            None => Location::city(s),
        }),
    }
}

pub fn classify_row(row: &RawRow, stores: &dyn StoreLookup) -> Result<Vec<ParcelEvent>, TrackError> {
    let when = when_or_malformed(Carrier::PostAt, parse_dotted_datetime(&row.date_time), &row.date_time)?;

    let Some((emits, tail)) = lookup(VOCABULARY, &row.status) else {
        debug!(carrier = "at.post", status = %row.status, "unclassified status");
        return Ok(vec![ParcelEvent::unclassified(when)]);
    };

    let mut ctx = EventContext::at(parse_place(&row.location));
    if emits.contains(&Emit::StoreDropOff) && !tail.trim().is_empty() {
        ctx.store = stores.lookup_store(Carrier::PostAt, tail.trim());
    }
    Ok(emit_all(emits, when, &ctx))
}
