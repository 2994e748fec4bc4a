// src/model/parcel.rs
use std::fmt;

use serde::Serialize;

use super::event::ParcelEvent;
use crate::carrier::Carrier;

/// A tracking number that passed its carrier's validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TrackingNumber {
    number: String,
    /// Raw scanned barcode when it carries more than the number (DPD).
    #[serde(skip_serializing_if = "Option::is_none")]
    barcode: Option<String>,
    /// Destination postcode decoded from the barcode, sent along with queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    postcode: Option<String>,
}

impl TrackingNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self { number: number.into(), barcode: None, postcode: None }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.number
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.number)
    }
}

/// Parcel weight, kept in grams so carrier decimals survive exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Weight {
    grams: u64,
}

impl Weight {
    pub fn from_grams(grams: u64) -> Self {
        Self { grams }
    }

    pub fn grams(&self) -> u64 {
        self.grams
    }

    /// `"1.5"`, `"12"`, `"0,75"` (kilograms, at most gram precision).
    pub fn from_kg_str(s: &str) -> Option<Self> {
        let s = s.trim().replace(',', ".");
        let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), ""));
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        if !int.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if frac.len() > 3 && frac[3..].bytes().any(|b| b != b'0') {
            return None;
        }
        let kg: u64 = if int.is_empty() { 0 } else { int.parse().ok()? };
        let mut g = s!(&frac[..frac.len().min(3)]);
        while g.len() < 3 { g.push('0'); }
        let grams: u64 = g.parse().ok()?;
        Some(Self { grams: kg.checked_mul(1000)?.checked_add(grams)? })
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} kg", self.grams / 1000, self.grams % 1000)
    }
}

/// Immutable snapshot of one shipment. A fresh fetch yields a fresh `Parcel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parcel {
    carrier: Carrier,
    tracking_number: TrackingNumber,
    product: Option<String>,
    weight: Option<Weight>,
    events: Vec<ParcelEvent>,
}

impl Parcel {
    pub fn new(
        carrier: Carrier,
        tracking_number: TrackingNumber,
        product: Option<String>,
        weight: Option<Weight>,
        events: Vec<ParcelEvent>,
    ) -> Self {
        Self { carrier, tracking_number, product, weight, events }
    }

    pub fn carrier(&self) -> Carrier { self.carrier }
    pub fn tracking_number(&self) -> &TrackingNumber { &self.tracking_number }
    pub fn product(&self) -> Option<&str> { self.product.as_deref() }
    pub fn weight(&self) -> Option<Weight> { self.weight }

    /// Events, oldest first.
    pub fn events(&self) -> &[ParcelEvent] { &self.events }

    pub fn first_event(&self) -> Option<&ParcelEvent> { self.events.first() }
    pub fn last_event(&self) -> Option<&ParcelEvent> { self.events.last() }

    pub fn is_delivered(&self) -> bool {
        self.events.iter().any(|e| e.kind.is_delivery())
    }
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.carrier.short_name(),
            self.product.as_deref().unwrap_or("parcel"),
            self.tracking_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_from_kg_strings() {
        assert_eq!(Weight::from_kg_str("1.5").map(|w| w.grams()), Some(1500));
        assert_eq!(Weight::from_kg_str("12").map(|w| w.grams()), Some(12000));
        assert_eq!(Weight::from_kg_str("0,075").map(|w| w.grams()), Some(75));
        assert_eq!(Weight::from_kg_str("2.0000").map(|w| w.grams()), Some(2000));
        assert_eq!(Weight::from_kg_str("1.2345"), None);
        assert_eq!(Weight::from_kg_str("kg"), None);
        assert_eq!(Weight::from_grams(1234).to_string(), "1.234 kg");
    }
}
