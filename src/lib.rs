// src/lib.rs
//! Parcel-tracking normalization.
//!
//! Carrier payloads (HTML fragments, JSON documents) go in; one
//! [`Parcel`](model::Parcel) with a chronological, typed event history comes
//! out. Network access is not part of this crate: callers supply a
//! [`Fetch`](carrier::Fetch) implementation and everything downstream of it is
//! pure parsing.

#[macro_use]
pub mod macros;

pub mod carrier;
pub mod checksum;
pub mod classify;
pub mod config;
pub mod core;
pub mod csv;
pub mod error;
pub mod grammar;
pub mod markup;
pub mod model;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod log;

pub use carrier::{from_barcode, Carrier, Courier, Fetch, FileFetch, Shipment};
pub use config::TrackOptions;
pub use error::TrackError;
pub use model::{EventKind, Location, Parcel, ParcelEvent, Store, TrackingNumber, Weight};
