// src/classify/gls.rs
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::carrier::Carrier;
use crate::error::TrackError;
use crate::model::{Location, Notification, ParcelEvent};

use super::{emit_all, lookup, str_field, when_or_malformed, Emit, EventContext, Phrase};

// GLS seldom reports outbound scans and often repeats inbound ones, so every
// inbound variant is read as a plain sort.
pub const VOCABULARY: &[(Phrase, &[Emit])] = &[
    (Phrase::Exact("Delivered"), &[Emit::Delivered]),
    (Phrase::Exact("Delivered Handed over to neighbour"), &[Emit::DeliveredToNeighbour]),
    (Phrase::Exact("Delivered without proof of delivery"), &[Emit::DeliveredDropOff]),
    (Phrase::Exact("Out for delivery on GLS vehicle"), &[Emit::InDelivery]),
    (Phrase::Exact("Inbound to GLS location"), &[Emit::Sorted]),
    (Phrase::Exact("Inbound to GLS location sorted as Business-Small Parcel"), &[Emit::Sorted]),
    (Phrase::Exact("Inbound to GLS location manually sorted"), &[Emit::Sorted]),
    (Phrase::Exact("Outbound from GLS location"), &[Emit::OutboundSorted]),
    (Phrase::Exact("Not delivered because consignee not in"), &[Emit::RecipientUnavailable]),
    (Phrase::Exact("Consignee contacted Notification card"), &[Emit::Notified(Notification::Card)]),
    (Phrase::Exact("Delivered to a GLS Parcel Shop"), &[Emit::StoreDropOff]),
    (Phrase::Exact("Information transmitted, no shipment available now"), &[Emit::DataReceived]),
    (Phrase::Exact("Stored"), &[Emit::Stored]),
    (Phrase::Prefix("Retained at GLS location"), &[Emit::Stored]),
    (Phrase::Exact("Not delivered due to a wrong address"), &[Emit::WrongAddress]),
    (Phrase::Exact("Not delivered due to declined acceptance"), &[Emit::DeliveryRefused]),
    (Phrase::Exact("Not delivered Parcel Shop storage term is exceeded"), &[Emit::StoreNotCollected]),
    (Phrase::Exact("Returned to consignor"), &[Emit::Returned]),
    (Phrase::Exact("Data erased from GLS system"), &[Emit::Cancelled]),
];

fn location(entry: &Value) -> Option<Location> {
    let address = entry.get("address")?;
    let city = str_field(address, "city").filter(|c| !c.is_empty());
    let code = str_field(address, "countryCode").unwrap_or("");
    let loc = match city {
        Some(city) => Location::city(city),
        None => Location::new(),
    }
    .with_country_code(code);
    (!loc.is_empty()).then_some(loc)
}

/// One `tuStatus[0].history[]` element.
pub fn classify_entry(entry: &Value) -> Result<Vec<ParcelEvent>, TrackError> {
    let date = str_field(entry, "date").unwrap_or("");
    let time = str_field(entry, "time").unwrap_or("");
    let raw = join!(date, " ", time);
    let when = when_or_malformed(
        Carrier::Gls,
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").ok(),
        &raw,
    )?;

    let status = str_field(entry, "evtDscr").unwrap_or("");
    let Some((emits, _)) = lookup(VOCABULARY, status) else {
        debug!(carrier = "gls", status, "unclassified status");
        return Ok(vec![ParcelEvent::unclassified(when)]);
    };
    Ok(emit_all(emits, when, &EventContext::at(location(entry))))
}
