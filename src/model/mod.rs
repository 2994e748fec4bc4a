// src/model/mod.rs
//! Canonical data model shared by every carrier.

pub mod country;
pub mod event;
pub mod location;
pub mod parcel;

pub use country::{Country, CountryKey, CountryTable};
pub use event::{EventKind, Notification, ParcelEvent};
pub use location::{Location, Store};
pub use parcel::{Parcel, TrackingNumber, Weight};
