// src/model/event.rs
//! Canonical parcel events.
//!
//! One closed sum type covers every lifecycle step the supported carriers
//! report. Events order by timestamp first; ties fall back to the declaration
//! order of [`EventKind`] and then to the kind's payload, so `Ord` agrees with
//! `Eq`. Adapters sort with a stable sort on `when` alone, which keeps the
//! carrier's own order for same-minute events.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::location::{Location, Store};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How the recipient was told about a failed or diverted delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Notification {
    Card,
    FirstNotice,
    ParcelShopDelivery,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Notification::Card => "card",
            Notification::FirstNotice => "first notification",
            Notification::ParcelShopDelivery => "parcelshop delivery",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Fallback for statuses with no known mapping.
    Unclassified,
    DataReceived,
    Cancelled,
    Redirected,
    LabelPrinted { location: Option<Location> },
    Sorted { location: Option<Location> },
    InboundSorted { location: Option<Location> },
    OutboundSorted { location: Option<Location> },
    ManualSorted { location: Option<Location> },
    Stored { location: Option<Location> },
    Posted { location: Option<Location> },
    PickedUp { location: Option<Location> },
    InDelivery { location: Option<Location> },
    Delivered { location: Option<Location>, recipient: Option<String> },
    DeliveredToNeighbour { location: Option<Location>, recipient: Option<String> },
    DeliveredDropOff { location: Option<Location> },
    DeliveryFailed { location: Option<Location> },
    RecipientUnavailable { location: Option<Location> },
    WrongAddress { location: Option<Location> },
    DeliveryRefused { location: Option<Location> },
    RecipientNotified { location: Option<Location>, notification: Notification },
    StoreDropOff { location: Option<Location>, store: Option<Store> },
    StorePickup { location: Option<Location> },
    StoreNotCollected { location: Option<Location> },
    Returned { location: Option<Location> },
}

impl EventKind {
    pub fn description(&self) -> Option<&'static str> {
        use EventKind::*;
        Some(match self {
            Unclassified => return None,
            DataReceived => "received electronic shipping information",
            Cancelled => "cancelled",
            Redirected => "redirected",
            LabelPrinted { .. } => "parcel label printed",
            Sorted { .. } => "sort",
            InboundSorted { .. } => "inbound sort",
            OutboundSorted { .. } => "outbound sort",
            ManualSorted { .. } => "sort (manual)",
            Stored { .. } => "stored",
            Posted { .. } => "posted by sender",
            PickedUp { .. } => "pickup at sender's location",
            InDelivery { .. } => "out for delivery",
            Delivered { .. } => "delivered",
            DeliveredToNeighbour { .. } => "delivered to neighbour",
            DeliveredDropOff { .. } => "delivered without signature",
            DeliveryFailed { .. } => "delivery failed",
            RecipientUnavailable { .. } => "delivery failed because recipient unavailable",
            WrongAddress { .. } => "delivery failed due to wrong address",
            DeliveryRefused { .. } => "delivery refused by recipient",
            RecipientNotified { .. } => "recipient notified",
            StoreDropOff { .. } => "dropped off at store",
            StorePickup { .. } => "picked up from store",
            StoreNotCollected { .. } => "storage time exceeded",
            Returned { .. } => "returning",
        })
    }

    /// Where it happened. Store drop-offs prefer the resolved store's address.
    pub fn location(&self) -> Option<&Location> {
        use EventKind::*;
        match self {
            Unclassified | DataReceived | Cancelled | Redirected => None,
            StoreDropOff { location, store } => store
                .as_ref()
                .map(|s| &s.location)
                .or(location.as_ref()),
            LabelPrinted { location }
            | Sorted { location }
            | InboundSorted { location }
            | OutboundSorted { location }
            | ManualSorted { location }
            | Stored { location }
            | Posted { location }
            | PickedUp { location }
            | InDelivery { location }
            | Delivered { location, .. }
            | DeliveredToNeighbour { location, .. }
            | DeliveredDropOff { location }
            | DeliveryFailed { location }
            | RecipientUnavailable { location }
            | WrongAddress { location }
            | DeliveryRefused { location }
            | RecipientNotified { location, .. }
            | StorePickup { location }
            | StoreNotCollected { location }
            | Returned { location } => location.as_ref(),
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        match self {
            EventKind::Delivered { recipient, .. }
            | EventKind::DeliveredToNeighbour { recipient, .. } => recipient.as_deref(),
            _ => None,
        }
    }

    pub fn is_delivery(&self) -> bool {
        matches!(
            self,
            EventKind::Delivered { .. }
                | EventKind::DeliveredToNeighbour { .. }
                | EventKind::DeliveredDropOff { .. }
                | EventKind::StorePickup { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParcelEvent {
    pub when: NaiveDateTime,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl ParcelEvent {
    pub fn new(when: NaiveDateTime, kind: EventKind) -> Self {
        Self { when, kind }
    }

    pub fn unclassified(when: NaiveDateTime) -> Self {
        Self::new(when, EventKind::Unclassified)
    }

    pub fn location(&self) -> Option<&Location> {
        self.kind.location()
    }

    pub fn recipient(&self) -> Option<&str> {
        self.kind.recipient()
    }
}

impl fmt::Display for ParcelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.when.format(TIMESTAMP_FORMAT))?;
        if let Some(loc) = self.location() {
            write!(f, ", {}", loc)?;
        }
        let Some(desc) = self.kind.description() else {
            return Ok(());
        };
        write!(f, ": {}", desc)?;
        if let EventKind::RecipientNotified { notification, .. } = &self.kind {
            write!(f, " ({})", notification)?;
        }
        if let Some(r) = self.recipient() {
            write!(f, " (signature: {})", r)?;
        }
        Ok(())
    }
}
