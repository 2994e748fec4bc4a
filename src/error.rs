// src/error.rs
//! Error taxonomy.
//!
//! Structural failures (a payload that lost its table, a JSON document missing
//! its envelope) are errors. Vocabulary gaps are not: an unknown status text
//! becomes an unclassified event and never reaches this module.

use thiserror::Error;

use crate::carrier::Carrier;

#[derive(Debug, Error)]
pub enum TrackError {
    /// Length, shape or check digit mismatch. Raised before any fetch.
    #[error("invalid {carrier} tracking number: {number:?}")]
    InvalidTrackingNumber { carrier: Carrier, number: String },

    /// The carrier affirmatively reports that it knows no such shipment.
    #[error("{carrier} reports no parcel {number}")]
    UnknownParcel { carrier: Carrier, number: String },

    /// Required structural markers are missing; the carrier changed its format.
    #[error("malformed {carrier} payload: {reason}")]
    Malformed { carrier: Carrier, reason: String },

    /// The carrier never reports this property.
    #[error("{carrier} does not report {property}")]
    Unsupported { carrier: Carrier, property: &'static str },

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackError {
    pub fn malformed(carrier: Carrier, reason: impl std::fmt::Display) -> Self {
        TrackError::Malformed { carrier, reason: reason.to_string() }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, TrackError::Unsupported { .. })
    }
}

/// A shipment replays its one failed fetch to every later caller. The wrapped
/// library errors are not `Clone`; they are rebuilt from their kind and text.
impl Clone for TrackError {
    fn clone(&self) -> Self {
        match self {
            TrackError::InvalidTrackingNumber { carrier, number } => {
                TrackError::InvalidTrackingNumber { carrier: *carrier, number: number.clone() }
            }
            TrackError::UnknownParcel { carrier, number } => {
                TrackError::UnknownParcel { carrier: *carrier, number: number.clone() }
            }
            TrackError::Malformed { carrier, reason } => {
                TrackError::Malformed { carrier: *carrier, reason: reason.clone() }
            }
            TrackError::Unsupported { carrier, property } => {
                TrackError::Unsupported { carrier: *carrier, property: *property }
            }
            TrackError::Fetch(msg) => TrackError::Fetch(msg.clone()),
            TrackError::Json(e) => TrackError::Json(<serde_json::Error as serde::de::Error>::custom(e)),
            TrackError::Markup(e) => TrackError::Markup(e.clone()),
            TrackError::Grammar(e) => TrackError::Grammar(e.clone()),
            TrackError::Io(e) => TrackError::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

/// Structural violation inside an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("malformed table: </{tag}> while {state}")]
    Unbalanced { tag: &'static str, state: String },
}

/// Rejected input for one of the small text grammars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("bad location {0:?}")]
    Location(String),

    #[error("bad opening-hours token {0:?}")]
    Hours(String),

    #[error("unknown day label {0:?}")]
    Day(String),
}
