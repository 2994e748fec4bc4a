// src/carrier/mod.rs
//! # Carrier adapters
//!
//! Each supported courier is a unit struct implementing [`Courier`], exposed
//! as a `pub static COURIER` in its own module and registered in [`COURIERS`]
//! in barcode probe order. A courier knows:
//!
//! - which tracking-number shapes it accepts (checksum formats live in
//!   [`crate::checksum`] as data rows),
//! - how to phrase its requests and decode the raw response into a [`Payload`],
//! - how to split a payload into raw records and hand them to the classifier,
//! - which derived properties it reports at all ([`Property`]).
//!
//! Fetching and memoization live in [`Shipment`], not here: couriers are pure.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::classify::StoreLookup;
use crate::config::TrackOptions;
use crate::error::TrackError;
use crate::model::{ParcelEvent, Store, TrackingNumber, Weight};

pub mod dhl;
pub mod dpd;
pub mod fetch;
pub mod gls;
pub mod hermes;
pub mod post_at;
pub mod shipment;

pub use fetch::{Fetch, FileFetch, Request, RequestKind, Response};
pub use shipment::Shipment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Carrier {
    #[serde(rename = "dhl")]
    Dhl,
    #[serde(rename = "dpd")]
    Dpd,
    #[serde(rename = "gls")]
    Gls,
    #[serde(rename = "de.hermes")]
    Hermes,
    #[serde(rename = "at.post")]
    PostAt,
}

impl Carrier {
    pub const ALL: [Carrier; 5] = [Carrier::Dhl, Carrier::Dpd, Carrier::Gls, Carrier::Hermes, Carrier::PostAt];

    pub fn identifier(self) -> &'static str {
        match self {
            Carrier::Dhl => "dhl",
            Carrier::Dpd => "dpd",
            Carrier::Gls => "gls",
            Carrier::Hermes => "de.hermes",
            Carrier::PostAt => "at.post",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Carrier::Dhl => "Deutsche Post DHL",
            Carrier::Dpd => "Dynamic Parcel Distribution",
            Carrier::Gls => "General Logistics Systems",
            Carrier::Hermes => "Hermes",
            Carrier::PostAt => "Österreichische Post AG",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Carrier::Dhl => "DHL",
            Carrier::Dpd => "DPD",
            Carrier::Gls => "GLS",
            Carrier::Hermes => "Hermes",
            Carrier::PostAt => "Post.AT",
        }
    }

    pub fn from_identifier(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.identifier().eq_ignore_ascii_case(id.trim()))
    }

    /// File extension of captured payloads.
    pub fn payload_ext(self) -> &'static str {
        match self {
            Carrier::Dhl | Carrier::PostAt => "html",
            Carrier::Dpd | Carrier::Gls => "json",
            Carrier::Hermes => "js",
        }
    }

    pub fn courier(self) -> &'static dyn Courier {
        match self {
            Carrier::Dhl => &dhl::COURIER,
            Carrier::Dpd => &dpd::COURIER,
            Carrier::Gls => &gls::COURIER,
            Carrier::Hermes => &hermes::COURIER,
            Carrier::PostAt => &post_at::COURIER,
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Decoded primary response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Html(String),
    Json(Value),
}

impl Payload {
    pub fn as_html(&self, carrier: Carrier) -> Result<&str, TrackError> {
        match self {
            Payload::Html(s) => Ok(s),
            Payload::Json(_) => Err(TrackError::malformed(carrier, "expected an HTML payload")),
        }
    }

    pub fn as_json(&self, carrier: Carrier) -> Result<&Value, TrackError> {
        match self {
            Payload::Json(v) => Ok(v),
            Payload::Html(_) => Err(TrackError::malformed(carrier, "expected a JSON payload")),
        }
    }
}

/// Derived properties a carrier may or may not report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Product,
    Weight,
    Recipient,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Product => "product",
            Property::Weight => "weight",
            Property::Recipient => "recipient",
        }
    }
}

/// Deferred access to the primary payload; resolving it may trigger the fetch.
pub trait PayloadSource {
    fn load(&self) -> Result<&Payload, TrackError>;
}

pub trait Courier: Send + Sync + 'static {
    fn carrier(&self) -> Carrier;

    /// Barcode auto-detection: `Some` only for shapes this carrier claims.
    fn recognize(&self, barcode: &str) -> Option<TrackingNumber>;

    /// Explicit construction. Accepts at least what `recognize` accepts.
    fn parse_number(&self, input: &str) -> Result<TrackingNumber, TrackError> {
        self.recognize(input.trim()).ok_or_else(|| TrackError::InvalidTrackingNumber {
            carrier: self.carrier(),
            number: s!(input),
        })
    }

    /// Public web page for humans.
    fn tracking_link(&self, number: &TrackingNumber) -> String;

    fn tracking_request(&self, number: &TrackingNumber, options: &TrackOptions) -> Request;

    /// Turn the raw response into a payload, or say why there is none.
    fn decode(&self, number: &TrackingNumber, response: Response) -> Result<Payload, TrackError>;

    /// Classified events grouped per raw record, in the carrier's record order.
    fn record_events(&self, payload: &Payload, stores: &dyn StoreLookup) -> Result<Vec<Vec<ParcelEvent>>, TrackError>;

    /// Records arrive newest-first and must be reversed.
    fn newest_first(&self) -> bool {
        false
    }

    fn reports(&self, _property: Property) -> bool {
        false
    }

    fn product(&self, _number: &TrackingNumber, _payload: &dyn PayloadSource) -> Result<Option<String>, TrackError> {
        Ok(None)
    }

    fn weight(&self, _payload: &Payload) -> Result<Option<Weight>, TrackError> {
        Ok(None)
    }

    fn recipient(&self, _payload: &Payload) -> Result<Option<String>, TrackError> {
        Ok(None)
    }

    /// Number as the carrier reports it back (may add a check digit).
    fn canonical_number(&self, number: &TrackingNumber, _payload: &Payload) -> TrackingNumber {
        number.clone()
    }

    fn store_request(&self, _id: &str, _options: &TrackOptions) -> Option<Request> {
        None
    }

    fn decode_store(&self, _id: &str, _response: Response) -> Result<Option<Store>, TrackError> {
        Ok(None)
    }
}

/// Probe order for barcode auto-detection.
pub static COURIERS: &[&'static dyn Courier] = &[
    &dhl::COURIER,
    &dpd::COURIER,
    &gls::COURIER,
    &hermes::COURIER,
    &post_at::COURIER,
];

/// First carrier claiming `barcode`.
pub fn from_barcode(barcode: &str) -> Option<(Carrier, TrackingNumber)> {
    let barcode = barcode.trim();
    COURIERS
        .iter()
        .find_map(|c| c.recognize(barcode).map(|n| (c.carrier(), n)))
}

/// Common 404 / error status handling for primary responses.
pub(crate) fn check_status(carrier: Carrier, number: &TrackingNumber, response: &Response) -> Result<(), TrackError> {
    match response.status {
        404 => Err(TrackError::UnknownParcel { carrier, number: number.to_string() }),
        _ if response.is_success() => Ok(()),
        status => Err(TrackError::Fetch(format!("{} answered HTTP {}", carrier, status))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip() {
        for c in Carrier::ALL {
            assert_eq!(Carrier::from_identifier(c.identifier()), Some(c));
            assert_eq!(c.courier().carrier(), c);
        }
        assert_eq!(Carrier::PostAt.to_string(), "Post.AT");
        assert_eq!(Carrier::Hermes.identifier(), "de.hermes");
        assert_eq!(Carrier::from_identifier("DE.Hermes"), Some(Carrier::Hermes));
        assert_eq!(Carrier::from_identifier("ups"), None);
    }

    #[test]
    fn detection_order_matches_registry() {
        let order: Vec<Carrier> = COURIERS.iter().map(|c| c.carrier()).collect();
        assert_eq!(order, Carrier::ALL);
    }
}
