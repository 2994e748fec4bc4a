// src/carrier/shipment.rs
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;

use tracing::{info, warn};

use super::{from_barcode, Carrier, Courier, Fetch, Payload, PayloadSource, Property};
use crate::classify::StoreLookup;
use crate::config::TrackOptions;
use crate::error::TrackError;
use crate::model::{Parcel, ParcelEvent, Store, TrackingNumber, Weight};

/// A validated tracking number bound to its carrier and a fetcher.
///
/// The primary payload is fetched at most once, on first access to anything
/// that needs it. A failed fetch or decode is kept too and returned again. Store lookups are memoized separately, per store id: a
/// shipment that never mentions a store never fetches one, and a store seen in
/// several events is fetched once. Nothing is ever refreshed; track again with
/// a new `Shipment` for newer data.
pub struct Shipment<'f> {
    courier: &'static dyn Courier,
    number: TrackingNumber,
    fetcher: &'f dyn Fetch,
    options: TrackOptions,
    payload: OnceCell<Result<Payload, TrackError>>,
    stores: RefCell<HashMap<String, Option<Store>>>,
}

impl<'f> Shipment<'f> {
    /// Validate `input` for `carrier`. Rejection happens here, before any fetch.
    pub fn new(
        carrier: Carrier,
        input: &str,
        fetcher: &'f dyn Fetch,
        options: TrackOptions,
    ) -> Result<Self, TrackError> {
        let courier = carrier.courier();
        let number = courier.parse_number(input)?;
        Ok(Self::with_number(courier, number, fetcher, options))
    }

    /// Auto-detect the carrier; `None` if nobody claims the barcode.
    pub fn from_barcode(barcode: &str, fetcher: &'f dyn Fetch, options: TrackOptions) -> Option<Self> {
        let (carrier, number) = from_barcode(barcode)?;
        Some(Self::with_number(carrier.courier(), number, fetcher, options))
    }

    fn with_number(
        courier: &'static dyn Courier,
        number: TrackingNumber,
        fetcher: &'f dyn Fetch,
        options: TrackOptions,
    ) -> Self {
        Self {
            courier,
            number,
            fetcher,
            options,
            payload: OnceCell::new(),
            stores: RefCell::new(HashMap::new()),
        }
    }

    pub fn carrier(&self) -> Carrier {
        self.courier.carrier()
    }

    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.number
    }

    pub fn tracking_link(&self) -> String {
        self.courier.tracking_link(&self.number)
    }

    /// Raw decoded payload, fetching it on first call.
    pub fn payload(&self) -> Result<&Payload, TrackError> {
        self.payload.get_or_init(|| self.fetch_payload()).as_ref().map_err(TrackError::clone)
    }

    fn fetch_payload(&self) -> Result<Payload, TrackError> {
        let request = self.courier.tracking_request(&self.number, &self.options);
        info!(carrier = %self.carrier(), number = %self.number, url = %request.url, "fetching tracking data");
        let response = self.fetcher.fetch(&request)?;
        self.courier.decode(&self.number, response).inspect_err(|e| {
            warn!(carrier = %self.carrier(), number = %self.number, error = %e, "tracking data unusable");
        })
    }

    /// Events in ascending time order. Same-minute events keep record order.
    pub fn events(&self) -> Result<Vec<ParcelEvent>, TrackError> {
        let mut records = self.courier.record_events(self.payload()?, self)?;
        if self.courier.newest_first() {
            records.reverse();
        }
        let mut events: Vec<ParcelEvent> = records.into_iter().flatten().collect();
        events.sort_by_key(|e| e.when);
        Ok(events)
    }

    fn require(&self, property: Property) -> Result<(), TrackError> {
        if self.courier.reports(property) {
            Ok(())
        } else {
            Err(TrackError::Unsupported { carrier: self.carrier(), property: property.name() })
        }
    }

    pub fn product(&self) -> Result<Option<String>, TrackError> {
        self.require(Property::Product)?;
        self.courier.product(&self.number, self)
    }

    pub fn weight(&self) -> Result<Option<Weight>, TrackError> {
        self.require(Property::Weight)?;
        self.courier.weight(self.payload()?)
    }

    pub fn recipient(&self) -> Result<Option<String>, TrackError> {
        self.require(Property::Recipient)?;
        self.courier.recipient(self.payload()?)
    }

    /// Store details by id; `None` when the carrier has no store lookup or the
    /// lookup failed.
    pub fn store(&self, id: &str) -> Option<Store> {
        if let Some(hit) = self.stores.borrow().get(id) {
            return hit.clone();
        }
        let store = self.fetch_store(id).unwrap_or_else(|e| {
            warn!(carrier = %self.carrier(), store = id, error = %e, "store lookup failed");
            None
        });
        self.stores.borrow_mut().insert(s!(id), store.clone());
        store
    }

    fn fetch_store(&self, id: &str) -> Result<Option<Store>, TrackError> {
        let Some(request) = self.courier.store_request(id, &self.options) else {
            return Ok(None);
        };
        info!(carrier = %self.carrier(), store = id, url = %request.url, "fetching store details");
        let response = self.fetcher.fetch(&request)?;
        self.courier.decode_store(id, response)
    }

    /// Immutable snapshot. Properties the carrier never reports are `None`.
    pub fn parcel(&self) -> Result<Parcel, TrackError> {
        fn reported<T>(r: Result<Option<T>, TrackError>) -> Result<Option<T>, TrackError> {
            match r {
                Err(e) if e.is_unsupported() => Ok(None),
                other => other,
            }
        }

        let events = self.events()?;
        let number = self.courier.canonical_number(&self.number, self.payload()?);
        Ok(Parcel::new(
            self.carrier(),
            number,
            reported(self.product())?,
            reported(self.weight())?,
            events,
        ))
    }
}

impl PayloadSource for Shipment<'_> {
    fn load(&self) -> Result<&Payload, TrackError> {
        self.payload()
    }
}

impl StoreLookup for Shipment<'_> {
    fn lookup_store(&self, carrier: Carrier, id: &str) -> Option<Store> {
        debug_assert_eq!(carrier, self.carrier());
        self.store(id)
    }
}
