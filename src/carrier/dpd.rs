// src/carrier/dpd.rs
//! DPD: JSON life-cycle payloads and scanned `%` barcodes.
//!
//! Barcode layout (28 chars):
//!
//! ```text
//! %  PPPPPPP  NNNNNNNNNNNNNN  SSS  CCC
//! 0  1..8     8..22           22..25 25..28
//!    postcode parcel number   service country (ISO numeric)
//! ```
//!
//! The postcode is right-aligned before offset 8; its length depends on the
//! destination country.

use serde_json::Value;

use super::{check_status, Carrier, Courier, Payload, PayloadSource, Property, Request, RequestKind, Response};
use crate::classify::{self, RawRecord, Shared, StoreLookup};
use crate::config::consts::{DPD_LINK, DPD_STORE_URL, DPD_TRACKING_URL};
use crate::config::TrackOptions;
use crate::core::sanitize::non_empty;
use crate::error::TrackError;
use crate::grammar::hours::{weekday_from_number, DaySpan, HoursBuilder};
use crate::model::{Location, ParcelEvent, Store, TrackingNumber, Weight};

/// Destination country (ISO numeric) → postcode length. Default 7.
const POSTCODE_LENGTHS: &[(u16, usize)] = &[(40, 4), (276, 5)];

pub const PRODUCTS: &[(&[&str], &str)] = &[
    (&["101", "120"], "Normalpaket"),
    (&["102"], "Normalpaket, Gefahrgut"),
    (&["105", "124"], "Normalpaket, unfrei"),
    (&["109", "128"], "Normalpaket, Nachnahme"),
    (&["113", "132"], "Normalpaket, Austauschpaket"),
    (&["117"], "Normalpaket, Mitnahmepaket"),
    (&["118"], "Normalpaket, Austauschpaket (retour)"),
    (&["136", "146"], "Kleinpaket"),
    (&["138", "148"], "Kleinpaket, unfrei"),
    (&["140", "150"], "Kleinpaket, Nachnahme"),
    (&["142", "152"], "Kleinpaket, Austauschpaket"),
    (&["144"], "Kleinpaket, Mitnahmepaket"),
    (&["145"], "Kleinpaket, Austauschpaket (retour)"),
    (&["154"], "Parcelletter"),
    (&["155", "168"], "Garantiepaket"),
    (&["158", "171"], "Garantiepaket, unfrei"),
    (&["161"], "Garantiepaket, Nachnahme"),
    (&["164", "177"], "Garantiepaket, Austauschpaket"),
    (&["166"], "Garantiepaket, Austauschpaket (retour)"),
    (&["179"], "Express 10:00"),
    (&["225"], "Express 12:00"),
    (&["228"], "Express 12:00 Samstag"),
    (&["298"], "Retoure an Versender"),
    (&["299"], "Systemretoure international Express"),
    (&["300"], "Systemretoure"),
    (&["327"], "Normalpaket B2C"),
    (&["328"], "Kleinpaket B2C"),
    (&["332"], "Retoure"),
    (&["365"], "Reifenlogistik"),
    (&["817"], "Postübergabe"),
];

const EXPRESS: &[&str] = &["179", "225", "228", "299"];
const CASH_ON_DELIVERY: &[&str] = &["109", "113", "128", "132", "140", "142", "150", "152", "158", "161", "171"];

pub fn product_name(code: &str) -> Option<&'static str> {
    PRODUCTS
        .iter()
        .find(|(codes, _)| codes.contains(&code))
        .map(|&(_, name)| name)
}

pub fn is_express(code: &str) -> bool {
    EXPRESS.contains(&code)
}

pub fn is_cash_on_delivery(code: &str) -> bool {
    CASH_ON_DELIVERY.contains(&code)
}

/// Split a 28-char `%` barcode into number, postcode and the barcode itself.
pub fn decode_barcode(barcode: &str) -> Option<TrackingNumber> {
    let digits = barcode.strip_prefix('%')?;
    if barcode.len() != 28 || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let country: u16 = barcode[25..28].parse().ok()?;
    let len = POSTCODE_LENGTHS
        .iter()
        .find(|(c, _)| *c == country)
        .map_or(7, |&(_, l)| l);
    Some(
        TrackingNumber::new(&barcode[8..22])
            .with_barcode(barcode)
            .with_postcode(barcode[8 - len..8].trim_start_matches(' ')),
    )
}

/// Service code from the barcode, if the number came from one.
pub fn barcode_service_code(number: &TrackingNumber) -> Option<&str> {
    number.barcode().map(|b| &b[22..25])
}

fn shipment_info(payload: &Payload) -> Result<&Value, TrackError> {
    payload
        .as_json(Carrier::Dpd)?
        .get("shipmentInfo")
        .ok_or_else(|| TrackError::malformed(Carrier::Dpd, "shipmentInfo missing"))
}

/// `shipmentInfo.additionalProperties[key=RECEIVER_NAME]`.
pub fn receiver_name(data: &Value) -> Option<&str> {
    data.pointer("/shipmentInfo/additionalProperties")?
        .as_array()?
        .iter()
        .find(|p| classify::str_field(p, "key") == Some("RECEIVER_NAME"))
        .and_then(|p| classify::str_field(p, "value"))
        .filter(|v| !v.is_empty())
}

/// Service code for `number`: from the barcode when scanned, else from the payload.
pub fn service_code(number: &TrackingNumber, payload: &dyn PayloadSource) -> Result<Option<String>, TrackError> {
    if let Some(code) = barcode_service_code(number) {
        return Ok(Some(s!(code)));
    }
    let info = shipment_info(payload.load()?)?;
    Ok(classify::str_field(info, "serviceCode").and_then(non_empty))
}

fn weight_grams(m: &Value) -> Option<u64> {
    let grams = match m.get("weightGram")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    grams.filter(|&g| g > 0)
}

pub struct Dpd;
pub static COURIER: Dpd = Dpd;

impl Courier for Dpd {
    fn carrier(&self) -> Carrier {
        Carrier::Dpd
    }

    fn recognize(&self, barcode: &str) -> Option<TrackingNumber> {
        if barcode.len() == 27 && barcode.bytes().all(|b| b.is_ascii_digit()) {
            return decode_barcode(&join!("%", barcode));
        }
        decode_barcode(barcode)
    }

    /// Also accepts the bare 14-digit parcel number.
    fn parse_number(&self, input: &str) -> Result<TrackingNumber, TrackError> {
        let input = input.trim();
        if input.len() == 14 && input.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(TrackingNumber::new(input));
        }
        self.recognize(input).ok_or_else(|| TrackError::InvalidTrackingNumber {
            carrier: Carrier::Dpd,
            number: s!(input),
        })
    }

    fn tracking_link(&self, number: &TrackingNumber) -> String {
        DPD_LINK.replace("{n}", number.as_str())
    }

    fn tracking_request(&self, number: &TrackingNumber, options: &TrackOptions) -> Request {
        let mut url = options.url(DPD_TRACKING_URL, number.as_str());
        if let Some(postcode) = number.postcode() {
            url.push('/');
            url.push_str(postcode);
        }
        Request {
            carrier: Carrier::Dpd,
            kind: RequestKind::Tracking(number.to_string()),
            url,
            timeout: options.timeout,
        }
    }

    fn decode(&self, number: &TrackingNumber, response: Response) -> Result<Payload, TrackError> {
        check_status(Carrier::Dpd, number, &response)?;
        let mut doc: Value = serde_json::from_str(&response.body)?;
        let data = doc
            .pointer_mut("/parcellifecycleResponse")
            .ok_or_else(|| TrackError::malformed(Carrier::Dpd, "parcellifecycleResponse missing"))?
            .get_mut("parcelLifeCycleData")
            .map(Value::take)
            .unwrap_or(Value::Null);
        if data.is_null() {
            return Err(TrackError::UnknownParcel { carrier: Carrier::Dpd, number: number.to_string() });
        }
        Ok(Payload::Json(data))
    }

    fn record_events(&self, payload: &Payload, stores: &dyn StoreLookup) -> Result<Vec<Vec<ParcelEvent>>, TrackError> {
        let data = payload.as_json(Carrier::Dpd)?;
        let scans = data
            .pointer("/scanInfo/scan")
            .and_then(Value::as_array)
            .ok_or_else(|| TrackError::malformed(Carrier::Dpd, "scanInfo.scan missing"))?;
        let shared = Shared { recipient: receiver_name(data) };
        scans
            .iter()
            .map(|scan| classify::classify(Carrier::Dpd, RawRecord::Json(scan), shared, stores))
            .collect()
    }

    fn reports(&self, _property: Property) -> bool {
        true
    }

    fn product(&self, number: &TrackingNumber, payload: &dyn PayloadSource) -> Result<Option<String>, TrackError> {
        if let Some(name) = barcode_service_code(number).and_then(product_name) {
            return Ok(Some(s!(name)));
        }
        let info = shipment_info(payload.load()?)?;
        let from_table = classify::str_field(info, "serviceCode").and_then(product_name);
        Ok(from_table
            .map(String::from)
            .or_else(|| classify::str_field(info, "productName").and_then(non_empty)))
    }

    /// First scan that carries a measured weight.
    fn weight(&self, payload: &Payload) -> Result<Option<Weight>, TrackError> {
        let data = payload.as_json(Carrier::Dpd)?;
        let grams = data
            .pointer("/scanInfo/scan")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|scan| scan.pointer("/scanData/parcelMeasurements"))
            .find_map(weight_grams);
        Ok(grams.map(Weight::from_grams))
    }

    fn recipient(&self, payload: &Payload) -> Result<Option<String>, TrackError> {
        Ok(receiver_name(payload.as_json(Carrier::Dpd)?).map(String::from))
    }

    fn store_request(&self, id: &str, options: &TrackOptions) -> Option<Request> {
        Some(Request {
            carrier: Carrier::Dpd,
            kind: RequestKind::StoreDetail(s!(id)),
            url: options.url(DPD_STORE_URL, id),
            timeout: options.timeout,
        })
    }

    fn decode_store(&self, _id: &str, response: Response) -> Result<Option<Store>, TrackError> {
        if response.status == 404 {
            return Ok(None);
        }
        let doc: Value = serde_json::from_str(&response.body)?;
        let shop = doc
            .pointer("/getParcelShopByIdResponse/parcelShop")
            .filter(|v| v.is_object())
            .ok_or_else(|| TrackError::malformed(Carrier::Dpd, "parcelShop missing"))?;
        parcel_shop(shop).map(Some)
    }
}

fn parcel_shop(shop: &Value) -> Result<Store, TrackError> {
    let field = |key| classify::str_field(shop, key).and_then(non_empty);

    let mut location = Location::new().with_country_code(classify::str_field(shop, "country").unwrap_or(""));
    location.name = field("company");
    location.address = match (field("street"), field("houseNo")) {
        (Some(street), Some(no)) => Some(join!(&street, " ", &no)),
        (street, _) => street,
    };
    location.postcode = field("zipCode");
    location.city = field("city");

    let days = shop.get("openingHours").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
    let hours = opening_hours(days)?;

    Ok(Store {
        location,
        opening_hours: non_empty(&hours),
        phone: field("contactPersonPhone").or_else(|| field("phone")),
        fax: field("fax"),
        email: field("contactPersonEmail").or_else(|| field("email")),
    })
}

/// Weekday records to the canonical hours string. A closed lunch break
/// (`closeMorning == openAfternoon`) collapses into one range.
fn opening_hours(days: &[Value]) -> Result<String, TrackError> {
    let mut hours = HoursBuilder::new();
    for day in days {
        if day.get("dayOff").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let weekday = day
            .get("weekdayNum")
            .and_then(Value::as_u64)
            .and_then(weekday_from_number)
            .ok_or_else(|| TrackError::malformed(Carrier::Dpd, "weekdayNum out of range"))?;
        let t = |key| classify::str_field(day, key).unwrap_or("");
        hours.open_day(DaySpan::single(weekday));
        if t("closeMorning") == t("openAfternoon") {
            hours.add_range_str(t("openMorning"), t("closeAfternoon"))?;
        } else {
            hours.add_range_str(t("openMorning"), t("closeMorning"))?;
            hours.add_range_str(t("openAfternoon"), t("closeAfternoon"))?;
        }
    }
    Ok(hours.render())
}
