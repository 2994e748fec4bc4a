// src/carrier/post_at.rs
//! Österreichische Post: HTML history table, newest row first.
//!
//! The product is encoded in the tracking number itself, so asking for it
//! never triggers a fetch. Branch pickups name a branch number in the status
//! text; that branch is resolved through a second HTML page.

use std::sync::OnceLock;

use regex::Regex;

use super::{check_status, Carrier, Courier, Payload, PayloadSource, Property, Request, RequestKind, Response};
use crate::checksum::POST_AT;
use crate::classify::{self, RawRecord, Shared, StoreLookup};
use crate::config::consts::{POST_AT_LINK, POST_AT_STORE_URL, POST_AT_TRACKING_URL};
use crate::config::TrackOptions;
use crate::core::html::slice_between_ci;
use crate::error::TrackError;
use crate::grammar::parse_opening_hours;
use crate::markup::{parse_rows, parse_store, StoreSections};
use crate::model::{Location, ParcelEvent, Store, TrackingNumber};

pub const EVENT_TABLE: &str = r#"<table class="tracking-history""#;

pub const PRODUCTS: &[(&str, &str)] = &[
    ("01", "Paket Österreich"),
    ("02", "Paket Premium select Österreich"),
    ("03", "Premium light"),
    ("05", "Paket Österreich Postfiliale"),
    ("07", "Retourpaket"),
    ("08", "Paket Premium Österreich/Int. Outbound B2B"),
    ("10", "EMS Österreich/International Outbound"),
    ("12", "Combi-freight Österreich/Int. Outbound"),
    ("29", "Same Day"),
    ("30", "Next Day"),
    ("33", "Päckchen M"),
    ("36", "Paket Light International Outbound"),
    ("39", "Paket Plus International Outbound"),
];

/// Product id position depends on the number's length.
pub fn product_id(number: &str) -> Option<&str> {
    match number.len() {
        16 => number.get(4..6),
        22 => number.get(15..17),
        _ => None,
    }
}

pub fn product_from_number(number: &str) -> Option<&'static str> {
    let id = product_id(number)?;
    PRODUCTS.iter().find(|(p, _)| *p == id).map(|&(_, name)| name)
}

fn postcode_city_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})\s+(.+)$").unwrap())
}

/// Address rows are `[name,] [street,] postcode city`; the last row carrying a
/// postcode anchors the rest.
fn branch_location(lines: &[String]) -> Location {
    let mut location = Location::new().with_country_code("AT");
    let anchor = lines.iter().rposition(|l| postcode_city_re().is_match(l));
    let before = match anchor {
        Some(i) => {
            if let Some(caps) = postcode_city_re().captures(&lines[i]) {
                location.postcode = Some(s!(&caps[1]));
                location.city = Some(s!(&caps[2]));
            }
            &lines[..i]
        }
        None => lines,
    };
    match before {
        [] => {}
        [single] => location.name = Some(single.clone()),
        [name, .., street] => {
            location.name = Some(name.clone());
            location.address = Some(street.clone());
        }
    }
    location
}

fn branch_store(sections: StoreSections) -> Result<Store, TrackError> {
    let opening_hours = match sections.hours_text() {
        Some(text) => Some(parse_opening_hours(&text)?).filter(|h| !h.is_empty()),
        None => None,
    };
    Ok(Store {
        location: branch_location(&sections.address_lines),
        opening_hours,
        phone: sections.phone,
        fax: sections.fax,
        email: sections.email,
    })
}

pub struct PostAt;
pub static COURIER: PostAt = PostAt;

impl Courier for PostAt {
    fn carrier(&self) -> Carrier {
        Carrier::PostAt
    }

    fn recognize(&self, barcode: &str) -> Option<TrackingNumber> {
        POST_AT.validate(barcode).then(|| TrackingNumber::new(barcode))
    }

    fn tracking_link(&self, number: &TrackingNumber) -> String {
        POST_AT_LINK.replace("{n}", number.as_str())
    }

    fn tracking_request(&self, number: &TrackingNumber, options: &TrackOptions) -> Request {
        Request {
            carrier: Carrier::PostAt,
            kind: RequestKind::Tracking(number.to_string()),
            url: options.url(POST_AT_TRACKING_URL, number.as_str()),
            timeout: options.timeout,
        }
    }

    fn decode(&self, number: &TrackingNumber, response: Response) -> Result<Payload, TrackError> {
        check_status(Carrier::PostAt, number, &response)?;
        Ok(Payload::Html(response.body))
    }

    fn record_events(&self, payload: &Payload, stores: &dyn StoreLookup) -> Result<Vec<Vec<ParcelEvent>>, TrackError> {
        let html = payload.as_html(Carrier::PostAt)?;
        let table = slice_between_ci(html, EVENT_TABLE, "</table>")
            .ok_or_else(|| TrackError::malformed(Carrier::PostAt, "event table not found"))?;
        let rows = parse_rows(table, classify::post_at::LABELS)
            .map_err(|e| TrackError::malformed(Carrier::PostAt, e))?;
        rows.map(|row| classify::classify(Carrier::PostAt, RawRecord::Row(&row), Shared::default(), stores))
            .collect()
    }

    fn newest_first(&self) -> bool {
        true
    }

    fn reports(&self, property: Property) -> bool {
        property == Property::Product
    }

    /// Read off the number; the payload is never loaded.
    fn product(&self, number: &TrackingNumber, _payload: &dyn PayloadSource) -> Result<Option<String>, TrackError> {
        Ok(product_from_number(number.as_str()).map(String::from))
    }

    fn store_request(&self, id: &str, options: &TrackOptions) -> Option<Request> {
        Some(Request {
            carrier: Carrier::PostAt,
            kind: RequestKind::StoreDetail(s!(id)),
            url: options.url(POST_AT_STORE_URL, id),
            timeout: options.timeout,
        })
    }

    fn decode_store(&self, _id: &str, response: Response) -> Result<Option<Store>, TrackError> {
        if !response.is_success() {
            return Ok(None);
        }
        let sections = parse_store(&response.body)?;
        if sections == StoreSections::default() {
            return Ok(None);
        }
        branch_store(sections).map(Some)
    }
}
