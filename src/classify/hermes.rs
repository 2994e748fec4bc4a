// src/classify/hermes.rs
use serde_json::Value;
use tracing::debug;

use crate::carrier::Carrier;
use crate::error::TrackError;
use crate::model::{Location, ParcelEvent};

use super::{emit_all, lookup, parse_dotted_datetime, str_field, when_or_malformed, Emit, EventContext, Phrase};

/// Where an event's location comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    None,
    /// The status text after the matched prefix is a city in this country.
    Tail { country: &'static str, trim: &'static str },
    Named { name: &'static str, country: &'static str },
    /// Only the record's `countryCode`.
    RecordCountry,
    /// `zipCode`, `city` and `countryCode` of the record.
    RecordAddress,
}

pub const VOCABULARY: &[(Phrase, (Emit, Place))] = &[
    (Phrase::Exact("The parcel has been announced electronically to Hermes."), (Emit::DataReceived, Place::None)),
    (Phrase::Exact("Parcel has left the client\u{2019}s warehouse"), (Emit::PickedUp, Place::None)),
    (Phrase::Exact("The parcel has been received by the Hermes Parcel Shop."), (Emit::Posted, Place::None)),
    (
        Phrase::Exact("The parcel has been picked-up at the Hermes ParcelShop and sorted for further shipment."),
        (Emit::PickedUp, Place::None),
    ),
    // AT
    (Phrase::Prefix("The parcel has been sorted / "), (Emit::Sorted, Place::Tail { country: "AT", trim: "" })),
    // DE
    (
        Phrase::Prefix("The parcel is located at the Hermes depot "),
        (Emit::Sorted, Place::Tail { country: "DE", trim: "." }),
    ),
    (
        Phrase::Prefix("The parcel has been received by Hermes depot "),
        (Emit::Sorted, Place::Tail { country: "DE", trim: "" }),
    ),
    (
        Phrase::Prefix("The parcel has been received at the Hermes depot "),
        (Emit::Sorted, Place::Tail { country: "DE", trim: "" }),
    ),
    (
        Phrase::Exact("The parcel has been sorted at a Hermes Logistic Hub."),
        (Emit::Sorted, Place::Named { name: "Hermes Logistic Hub", country: "DE" }),
    ),
    (Phrase::Exact("The Parcel is out for delivery today"), (Emit::InDelivery, Place::RecordCountry)),
    (Phrase::Exact("\"The parcel is out for delivery"), (Emit::InDelivery, Place::RecordCountry)),
    (Phrase::Exact("The parcel has been delivered."), (Emit::Delivered, Place::RecordAddress)),
];

fn resolve(place: Place, tail: &str, entry: &Value) -> Option<Location> {
    let record = |key| str_field(entry, key).filter(|s| !s.is_empty());
    let loc = match place {
        Place::None => return None,
        Place::Tail { country, trim } => {
            let city = tail.strip_suffix(trim).unwrap_or(tail).trim();
            Location::city(city).with_country_code(country)
        }
        Place::Named { name, country } => Location::new().with_name(name).with_country_code(country),
        Place::RecordCountry => Location::new().with_country_code(record("countryCode").unwrap_or("")),
        Place::RecordAddress => {
            let mut loc = Location::new().with_country_code(record("countryCode").unwrap_or(""));
            loc.postcode = record("zipCode").map(String::from);
            loc.city = record("city").map(String::from);
            loc
        }
    };
    (!loc.is_empty()).then_some(loc)
}

/// One `status[]` element of the decoded history.
pub fn classify_entry(entry: &Value) -> Result<Vec<ParcelEvent>, TrackError> {
    let raw = join!(
        str_field(entry, "statusDate").unwrap_or(""),
        " ",
        str_field(entry, "statusTime").unwrap_or("")
    );
    let when = when_or_malformed(Carrier::Hermes, parse_dotted_datetime(&raw), &raw)?;

    let status = str_field(entry, "statusDescription").unwrap_or("");
    match lookup(VOCABULARY, status) {
        Some(((emit, place), tail)) => {
            let ctx = EventContext::at(resolve(*place, tail, entry));
            Ok(emit_all(&[*emit], when, &ctx))
        }
        None => {
            debug!(carrier = "de.hermes", status, "unclassified status");
            Ok(vec![ParcelEvent::unclassified(when)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use serde_json::json;

    fn entry(status: &str) -> Value {
        json!({
            "statusDate": "05.02.2020",
            "statusTime": "17:45:12",
            "statusDescription": status,
            "countryCode": "DE",
            "zipCode": "22089",
            "city": "Hamburg"
        })
    }

    #[test]
    fn city_from_status_suffix() {
        let ev = classify_entry(&entry("The parcel is located at the Hermes depot Ketzin.")).unwrap();
        assert_eq!(ev[0].location().and_then(|l| l.city.as_deref()), Some("Ketzin"));

        let ev = classify_entry(&entry("The parcel has been sorted / Graz")).unwrap();
        assert_eq!(ev[0].location().and_then(|l| l.city.as_deref()), Some("Graz"));
    }

    #[test]
    fn delivery_takes_record_address() {
        let ev = classify_entry(&entry("The parcel has been delivered.")).unwrap();
        let EventKind::Delivered { location: Some(loc), recipient: None } = &ev[0].kind else {
            panic!("expected delivery, got {:?}", ev[0].kind);
        };
        assert_eq!(loc.postcode.as_deref(), Some("22089"));
        assert_eq!(loc.city.as_deref(), Some("Hamburg"));
        assert_eq!(ev[0].when.to_string(), "2020-02-05 17:45:12");
    }

    #[test]
    fn every_phrase_and_the_fallback() {
        for (phrase, _) in VOCABULARY {
            let text = match phrase {
                Phrase::Exact(t) => s!(*t),
                Phrase::Prefix(p) => join!(*p, "Berlin"),
            };
            let ev = classify_entry(&entry(&text)).unwrap();
            assert_ne!(ev[0].kind, EventKind::Unclassified, "{}", text);
        }
        let ev = classify_entry(&entry("Something new")).unwrap();
        assert_eq!(ev, vec![ParcelEvent::unclassified(ev[0].when)]);
    }
}
