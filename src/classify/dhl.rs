// src/classify/dhl.rs
use crate::carrier::Carrier;
use crate::error::TrackError;
use crate::markup::{Column, RawRow};
use crate::model::{Location, Notification, ParcelEvent};

use super::{emit_all, lookup, parse_dotted_datetime, when_or_malformed, Emit, EventContext, Phrase};

/// `data-label` values of the history table, German and English page variants.
pub const LABELS: &[(&str, Column)] = &[
    ("Datum/Uhrzeit", Column::DateTime),
    ("Date/time", Column::DateTime),
    ("Status", Column::Status),
    ("Ort", Column::Location),
    ("Location", Column::Location),
];

pub const VOCABULARY: &[(Phrase, &[Emit])] = &[
    (
        Phrase::Exact("The instruction data for this shipment have been provided by the sender to DHL electronically"),
        &[Emit::DataReceived],
    ),
    (Phrase::Exact("The shipment has been posted by the sender at the retail outlet"), &[Emit::Posted]),
    (Phrase::Exact("The shipment has been picked up"), &[Emit::PickedUp]),
    (Phrase::Exact("The shipment has been processed in the parcel center of origin"), &[Emit::Sorted]),
    (Phrase::Exact("The shipment has been processed in the destination parcel center"), &[Emit::Sorted]),
    (Phrase::Exact("The shipment has been loaded onto the delivery vehicle"), &[Emit::InDelivery]),
    (Phrase::Exact("The shipment has been successfully delivered"), &[Emit::Delivered]),
    (
        Phrase::Exact("The recipient was not present. A notification card has been left"),
        &[Emit::RecipientUnavailable, Emit::Notified(Notification::Card)],
    ),
    (Phrase::Exact("The item has been sent."), &[Emit::DeliveredDropOff]),
];

pub fn classify_row(row: &RawRow) -> Result<Vec<ParcelEvent>, TrackError> {
    let when = when_or_malformed(Carrier::Dhl, parse_dotted_datetime(&row.date_time), &row.date_time)?;

    let Some((emits, _)) = lookup(VOCABULARY, &row.status) else {
        tracing::debug!(carrier = "dhl", status = %row.status, "unclassified status");
        return Ok(vec![ParcelEvent::unclassified(when)]);
    };

    // Drop-off confirmations carry the sender's outlet, not the destination.
    let location = match (emits, row.location.as_str()) {
        ([Emit::DeliveredDropOff], _) | (_, "" | "--") => None,
        (_, city) => Some(Location::city(city)),
    };
    Ok(emit_all(emits, when, &EventContext::at(location)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;

    fn row(status: &str, location: &str) -> RawRow {
        RawRow { date_time: s!("Mo., 03.02.2020 08:15 h"), status: s!(status), location: s!(location) }
    }

    #[test]
    fn every_phrase_classifies() {
        for (phrase, emits) in VOCABULARY {
            let Phrase::Exact(text) = phrase else { continue };
            let events = classify_row(&row(text, "Leipzig")).unwrap();
            assert_eq!(events.len(), emits.len(), "{}", text);
            assert!(events.iter().all(|e| e.kind != EventKind::Unclassified), "{}", text);
        }
    }

    #[test]
    fn dashes_mean_no_location() {
        let ev = classify_row(&row("The shipment has been picked up", "--")).unwrap();
        assert_eq!(ev[0].kind, EventKind::PickedUp { location: None });
    }

    #[test]
    fn unknown_phrase_is_unclassified() {
        let ev = classify_row(&row("The shipment is on a boat", "Hamburg")).unwrap();
        assert_eq!(ev, vec![ParcelEvent::unclassified(ev[0].when)]);
    }

    #[test]
    fn garbage_timestamp_is_malformed() {
        let mut r = row("The shipment has been picked up", "Bonn");
        r.date_time = s!("soon");
        assert!(matches!(classify_row(&r), Err(TrackError::Malformed { .. })));
    }
}
