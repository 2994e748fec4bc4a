// src/carrier/gls.rs
use serde_json::Value;

use super::{check_status, Carrier, Courier, Payload, PayloadSource, Property, Request, RequestKind, Response};
use crate::checksum::GLS_12;
use crate::classify::{self, RawRecord, Shared, StoreLookup};
use crate::config::consts::{GLS_LINK, GLS_TRACKING_URL};
use crate::config::TrackOptions;
use crate::error::TrackError;
use crate::model::{ParcelEvent, TrackingNumber, Weight};

/// Customer-side references attached to a GLS unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub customer_id: Option<String>,
    pub shipment: Option<String>,
    pub parcel: Option<String>,
}

pub struct Gls;
pub static COURIER: Gls = Gls;

/// `tuStatus[0]`, the only tracking unit a single-number query returns.
fn unit(payload: &Payload) -> Result<&Value, TrackError> {
    payload
        .as_json(Carrier::Gls)?
        .pointer("/tuStatus/0")
        .ok_or_else(|| TrackError::malformed(Carrier::Gls, "tuStatus is empty"))
}

fn typed<'v>(unit: &'v Value, list: &str, kind: &str) -> impl Iterator<Item = &'v Value> + use<'v> {
    let kind = s!(kind);
    unit.get(list)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(move |v| classify::str_field(v, "type") == Some(kind.as_str()))
}

fn info<'v>(unit: &'v Value, kind: &str) -> Option<&'v str> {
    typed(unit, "infos", kind)
        .find_map(|v| classify::str_field(v, "value"))
        .filter(|v| !v.is_empty())
}

pub fn references(payload: &Payload) -> Result<References, TrackError> {
    let unit = unit(payload)?;
    let mut refs = References::default();
    for r in typed(unit, "references", "GLSREF") {
        refs.customer_id = classify::str_field(r, "value").map(String::from);
    }
    for r in typed(unit, "references", "CUSTREF") {
        let value = classify::str_field(r, "value").map(String::from);
        match classify::str_field(r, "name") {
            Some("Customer's own reference number") => refs.shipment = value,
            Some("Customers own reference number - per TU") => refs.parcel = value,
            _ => {}
        }
    }
    Ok(refs)
}

impl Courier for Gls {
    fn carrier(&self) -> Carrier {
        Carrier::Gls
    }

    fn recognize(&self, barcode: &str) -> Option<TrackingNumber> {
        if let Some(n) = GLS_12.accept(barcode) {
            return Some(TrackingNumber::new(n));
        }
        (barcode.len() == 8 && barcode.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()))
            .then(|| TrackingNumber::new(barcode))
    }

    fn tracking_link(&self, number: &TrackingNumber) -> String {
        GLS_LINK.replace("{n}", number.as_str())
    }

    fn tracking_request(&self, number: &TrackingNumber, options: &TrackOptions) -> Request {
        Request {
            carrier: Carrier::Gls,
            kind: RequestKind::Tracking(number.to_string()),
            url: options.url(GLS_TRACKING_URL, number.as_str()),
            timeout: options.timeout,
        }
    }

    fn decode(&self, number: &TrackingNumber, response: Response) -> Result<Payload, TrackError> {
        check_status(Carrier::Gls, number, &response)?;
        let doc: Value = serde_json::from_str(&response.body)?;
        if doc.get("tuStatus").is_none() {
            return Err(TrackError::UnknownParcel { carrier: Carrier::Gls, number: number.to_string() });
        }
        Ok(Payload::Json(doc))
    }

    fn record_events(&self, payload: &Payload, stores: &dyn StoreLookup) -> Result<Vec<Vec<ParcelEvent>>, TrackError> {
        let history = unit(payload)?
            .get("history")
            .and_then(Value::as_array)
            .ok_or_else(|| TrackError::malformed(Carrier::Gls, "history missing"))?;
        history
            .iter()
            .map(|entry| classify::classify(Carrier::Gls, RawRecord::Json(entry), Shared::default(), stores))
            .collect()
    }

    fn newest_first(&self) -> bool {
        true
    }

    fn reports(&self, property: Property) -> bool {
        matches!(property, Property::Product | Property::Weight)
    }

    fn product(&self, _number: &TrackingNumber, payload: &dyn PayloadSource) -> Result<Option<String>, TrackError> {
        Ok(info(unit(payload.load()?)?, "PRODUCT").map(String::from))
    }

    /// `"2.5 kg"`; any other unit means the format changed.
    fn weight(&self, payload: &Payload) -> Result<Option<Weight>, TrackError> {
        let Some(raw) = info(unit(payload)?, "WEIGHT") else {
            return Ok(None);
        };
        raw.strip_suffix(" kg")
            .and_then(Weight::from_kg_str)
            .map(Some)
            .ok_or_else(|| TrackError::malformed(Carrier::Gls, format!("unexpected weight {:?}", raw)))
    }

    /// `tuNo` with its check digit; the query number when `tuNo` is absent.
    fn canonical_number(&self, number: &TrackingNumber, payload: &Payload) -> TrackingNumber {
        unit(payload)
            .ok()
            .and_then(|u| classify::str_field(u, "tuNo"))
            .and_then(|tu| GLS_12.complete(tu))
            .map_or_else(|| number.clone(), TrackingNumber::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Payload {
        Payload::Json(json!({
            "tuStatus": [{
                "tuNo": "12345678901",
                "infos": [
                    { "type": "WEIGHT", "name": "Weight", "value": "2.5 kg" },
                    { "type": "PRODUCT", "name": "Product", "value": "Parcel" }
                ],
                "references": [
                    { "type": "GLSREF", "name": "GLS reference", "value": "GLS-42" },
                    { "type": "CUSTREF", "name": "Customer's own reference number", "value": "ORDER-1" },
                    { "type": "CUSTREF", "name": "Customers own reference number - per TU", "value": "BOX-3" }
                ],
                "history": []
            }]
        }))
    }

    #[test]
    fn derives_missing_check_digit() {
        assert_eq!(COURIER.recognize("12345678901").unwrap().as_str(), "123456789011");
        assert!(COURIER.recognize("123456789011").is_some());
        assert!(COURIER.recognize("123456789012").is_none());
        assert!(COURIER.recognize("ZXCV1234").is_some());
        assert!(COURIER.recognize("zxcv1234").is_none());
    }

    #[test]
    fn unit_properties() {
        let p = payload();
        assert_eq!(COURIER.weight(&p).unwrap(), Some(Weight::from_grams(2500)));
        assert_eq!(COURIER.canonical_number(&TrackingNumber::new("ZXCV1234"), &p).as_str(), "123456789011");
        let refs = references(&p).unwrap();
        assert_eq!(refs.customer_id.as_deref(), Some("GLS-42"));
        assert_eq!(refs.shipment.as_deref(), Some("ORDER-1"));
        assert_eq!(refs.parcel.as_deref(), Some("BOX-3"));
    }

    #[test]
    fn missing_status_is_unknown() {
        let err = COURIER
            .decode(&TrackingNumber::new("ZXCV1234"), Response::ok("{\"lastError\":\"notfound\"}"))
            .unwrap_err();
        assert!(matches!(err, TrackError::UnknownParcel { .. }));
    }

    #[test]
    fn bad_weight_unit_is_malformed() {
        let p = Payload::Json(json!({ "tuStatus": [{ "infos": [{ "type": "WEIGHT", "value": "5 lb" }] }] }));
        assert!(matches!(COURIER.weight(&p), Err(TrackError::Malformed { .. })));
    }
}
