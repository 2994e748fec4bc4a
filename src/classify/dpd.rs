// src/classify/dpd.rs
//! DPD scan codes.
//!
//! A scan is keyed by `scanData.scanType.code`. Most codes map straight to one
//! event; a few are refined by the scan's additional codes or its info
//! container name, and code 23 resolves the parcel shop through a secondary
//! lookup.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::carrier::Carrier;
use crate::error::TrackError;
use crate::grammar::parse_city_country;
use crate::model::{Location, Notification, ParcelEvent};

use super::{emit_all, str_field, when_or_malformed, Emit, EventContext, StoreLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Plain(Emit),
    /// 08: wrong address if additional code 011, otherwise a generic failure.
    Undeliverable,
    /// 13: drop-off if additional code 068/069, otherwise signed delivery.
    Delivery,
    /// 14: recipient absent, plus one notification per notice code.
    NotHome,
    /// 18: decided by the info container name.
    Info,
    /// 23: parcel shop drop-off.
    ParcelShop,
}

pub const CODES: &[(&str, Rule)] = &[
    ("01", Rule::Plain(Emit::Sorted)),
    ("02", Rule::Plain(Emit::Sorted)),
    ("03", Rule::Plain(Emit::InDelivery)),
    ("04", Rule::Plain(Emit::InboundSorted)),
    ("05", Rule::Plain(Emit::InboundSorted)),
    ("08", Rule::Undeliverable),
    ("10", Rule::Plain(Emit::Sorted)),
    ("13", Rule::Delivery),
    ("14", Rule::NotHome),
    ("15", Rule::Plain(Emit::PickedUp)),
    ("18", Rule::Info),
    ("23", Rule::ParcelShop),
];

/// Sender goods issue carries no information of its own and yields nothing.
pub const INFO_CONTAINERS: &[(&str, &[Emit])] = &[
    ("IC_013301_SHIPMENT_DATA_TRANSMITTED", &[Emit::DataReceived]),
    ("IC_014101_SENDER_GOODS_ISSUE", &[]),
    ("IC_020301_MODIFIED_DELIVERY_INSTRUCTIONS", &[Emit::Redirected]),
    ("IC_012802_PARCELSHOP_HANDOVER", &[Emit::Redirected]),
    ("IC_012901_PARCELSHOP_PICKUP", &[Emit::StorePickup]),
];

pub const WRONG_ADDRESS_CODES: &[&str] = &["011"];
pub const DROP_OFF_CODES: &[&str] = &["068", "069"];
pub const NOTICE_CODES: &[(&str, Notification)] = &[
    ("019", Notification::FirstNotice),
    ("091", Notification::ParcelShopDelivery),
];

fn additional_codes(scan_data: &Value) -> impl Iterator<Item = &str> {
    scan_data
        .pointer("/additionalCodes/additionalCode")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|c| str_field(c, "code"))
}

fn scan_location(scan_data: &Value) -> Option<Location> {
    let raw = str_field(scan_data, "location").filter(|s| !s.is_empty())?;
    match parse_city_country(raw) {
        Ok(cc) => Some(cc.into_location()),
        Err(e) => {
            debug!(carrier = "dpd", error = %e, "scan location dropped");
            None
        }
    }
}

/// `ParcelShopId` query parameter of the scan's links.
pub fn parcel_shop_id(scan: &Value) -> Option<&str> {
    scan.get("links")?
        .as_array()?
        .iter()
        .filter_map(|l| l.get("queryParameters").and_then(Value::as_array))
        .flatten()
        .find(|p| str_field(p, "key") == Some("ParcelShopId"))
        .and_then(|p| str_field(p, "value"))
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// One `scanInfo.scan[]` element. `recipient` is the shipment's receiver name.
pub fn classify_scan(
    scan: &Value,
    recipient: Option<&str>,
    stores: &dyn StoreLookup,
) -> Result<Vec<ParcelEvent>, TrackError> {
    let raw = str_field(scan, "date").unwrap_or("");
    let when = when_or_malformed(Carrier::Dpd, parse_timestamp(raw), raw)?;

    let empty = Value::Null;
    let data = scan.get("scanData").unwrap_or(&empty);
    let code = data.pointer("/scanType/code").and_then(Value::as_str).unwrap_or("");

    let Some(&(_, rule)) = CODES.iter().find(|(c, _)| *c == code) else {
        debug!(carrier = "dpd", code, "unclassified scan code");
        return Ok(vec![ParcelEvent::unclassified(when)]);
    };

    let mut ctx = EventContext::at(scan_location(data));
    let has = |wanted: &[&str]| additional_codes(data).any(|c| wanted.contains(&c));

    let events = match rule {
        Rule::Plain(emit) => emit_all(&[emit], when, &ctx),
        Rule::Undeliverable if has(WRONG_ADDRESS_CODES) => emit_all(&[Emit::WrongAddress], when, &ctx),
        Rule::Undeliverable => emit_all(&[Emit::DeliveryFailed], when, &ctx),
        Rule::Delivery if has(DROP_OFF_CODES) => emit_all(&[Emit::DeliveredDropOff], when, &ctx),
        Rule::Delivery => {
            ctx.recipient = recipient.map(String::from);
            emit_all(&[Emit::Delivered], when, &ctx)
        }
        Rule::NotHome => {
            let mut emits = vec![Emit::RecipientUnavailable];
            emits.extend(additional_codes(data).filter_map(|c| {
                NOTICE_CODES.iter().find(|(n, _)| *n == c).map(|&(_, note)| Emit::Notified(note))
            }));
            emit_all(&emits, when, &ctx)
        }
        Rule::Info => {
            let name = data.pointer("/infoContainer/name").and_then(Value::as_str).unwrap_or("");
            match INFO_CONTAINERS.iter().find(|(n, _)| *n == name) {
                Some((_, emits)) => emit_all(emits, when, &ctx),
                None => {
                    debug!(carrier = "dpd", info = name, "unclassified info container");
                    vec![ParcelEvent::unclassified(when)]
                }
            }
        }
        Rule::ParcelShop => {
            ctx.store = parcel_shop_id(scan).and_then(|id| stores.lookup_store(Carrier::Dpd, id));
            emit_all(&[Emit::StoreDropOff], when, &ctx)
        }
    };
    Ok(events)
}
