// src/carrier/hermes.rs
use serde_json::Value;

use super::{check_status, Carrier, Courier, Payload, Request, RequestKind, Response};
use crate::checksum::HERMES_14;
use crate::classify::{self, RawRecord, Shared, StoreLookup};
use crate::config::consts::{HERMES_LINK, HERMES_TRACKING_URL};
use crate::config::TrackOptions;
use crate::error::TrackError;
use crate::model::{ParcelEvent, TrackingNumber};

pub struct Hermes;
pub static COURIER: Hermes = Hermes;

/// `callback({...});` → `{...}`. Bare JSON passes through.
pub fn strip_jsonp(body: &str) -> Option<&str> {
    let body = body.trim();
    if body.starts_with('{') {
        return Some(body);
    }
    let open = body.find('(')?;
    let close = body.rfind(')')?;
    (open < close).then(|| &body[open + 1..close])
}

impl Courier for Hermes {
    fn carrier(&self) -> Carrier {
        Carrier::Hermes
    }

    fn recognize(&self, barcode: &str) -> Option<TrackingNumber> {
        HERMES_14.validate(barcode).then(|| TrackingNumber::new(barcode))
    }

    fn tracking_link(&self, number: &TrackingNumber) -> String {
        HERMES_LINK.replace("{n}", number.as_str())
    }

    fn tracking_request(&self, number: &TrackingNumber, options: &TrackOptions) -> Request {
        Request {
            carrier: Carrier::Hermes,
            kind: RequestKind::Tracking(number.to_string()),
            url: options.url(HERMES_TRACKING_URL, number.as_str()),
            timeout: options.timeout,
        }
    }

    fn decode(&self, number: &TrackingNumber, response: Response) -> Result<Payload, TrackError> {
        check_status(Carrier::Hermes, number, &response)?;
        let json = strip_jsonp(&response.body)
            .ok_or_else(|| TrackError::malformed(Carrier::Hermes, "no JSONP wrapper"))?;
        let doc: Value = serde_json::from_str(json)?;
        match doc.get("status").and_then(Value::as_array) {
            Some(list) if !list.is_empty() => Ok(Payload::Json(doc)),
            Some(_) => Err(TrackError::UnknownParcel { carrier: Carrier::Hermes, number: number.to_string() }),
            None => Err(TrackError::malformed(Carrier::Hermes, "status list missing")),
        }
    }

    fn record_events(&self, payload: &Payload, stores: &dyn StoreLookup) -> Result<Vec<Vec<ParcelEvent>>, TrackError> {
        let status = payload
            .as_json(Carrier::Hermes)?
            .get("status")
            .and_then(Value::as_array)
            .ok_or_else(|| TrackError::malformed(Carrier::Hermes, "status list missing"))?;
        status
            .iter()
            .map(|entry| classify::classify(Carrier::Hermes, RawRecord::Json(entry), Shared::default(), stores))
            .collect()
    }

    fn newest_first(&self) -> bool {
        true
    }
}
