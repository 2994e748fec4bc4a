// src/carrier/dhl.rs
use std::sync::OnceLock;

use regex::Regex;

use super::{check_status, Carrier, Courier, Payload, Request, RequestKind, Response};
use crate::checksum::{DHL_12, DHL_20};
use crate::classify::{self, RawRecord, Shared, StoreLookup};
use crate::config::consts::{DHL_LINK, DHL_TRACKING_URL};
use crate::config::TrackOptions;
use crate::core::html::slice_between_ci;
use crate::error::TrackError;
use crate::markup::parse_rows;
use crate::model::{ParcelEvent, TrackingNumber};

/// Digit counts allowed after a `JJD` prefix.
const JJD_LENGTHS: &[usize] = &[13, 16, 17, 18, 20, 24];

pub struct Dhl;
pub static COURIER: Dhl = Dhl;

fn jjd_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^JJD(\d{13,24})$").unwrap())
}

impl Courier for Dhl {
    fn carrier(&self) -> Carrier {
        Carrier::Dhl
    }

    fn recognize(&self, barcode: &str) -> Option<TrackingNumber> {
        if DHL_12.validate(barcode) || DHL_20.validate(barcode) {
            return Some(TrackingNumber::new(barcode));
        }
        let caps = jjd_re().captures(barcode)?;
        JJD_LENGTHS
            .contains(&caps[1].len())
            .then(|| TrackingNumber::new(barcode.to_ascii_uppercase()))
    }

    fn tracking_link(&self, number: &TrackingNumber) -> String {
        DHL_LINK.replace("{n}", number.as_str())
    }

    fn tracking_request(&self, number: &TrackingNumber, options: &TrackOptions) -> Request {
        Request {
            carrier: Carrier::Dhl,
            kind: RequestKind::Tracking(number.to_string()),
            url: options.url(DHL_TRACKING_URL, number.as_str()),
            timeout: options.timeout,
        }
    }

    fn decode(&self, number: &TrackingNumber, response: Response) -> Result<Payload, TrackError> {
        check_status(Carrier::Dhl, number, &response)?;
        Ok(Payload::Html(response.body))
    }

    fn record_events(&self, payload: &Payload, stores: &dyn StoreLookup) -> Result<Vec<Vec<ParcelEvent>>, TrackError> {
        let html = payload.as_html(Carrier::Dhl)?;
        let table = slice_between_ci(html, r#"<table class="mm_event_table""#, "</table>")
            .ok_or_else(|| TrackError::malformed(Carrier::Dhl, "event table not found"))?;
        let rows = parse_rows(table, classify::dhl::LABELS)
            .map_err(|e| TrackError::malformed(Carrier::Dhl, e))?;
        rows.map(|row| classify::classify(Carrier::Dhl, RawRecord::Row(&row), Shared::default(), stores))
            .collect()
    }
}
