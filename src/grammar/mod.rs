// src/grammar/mod.rs
//! Small text grammars embedded in carrier payloads.

pub mod hours;
pub mod location;

pub use hours::{parse_opening_hours, DaySpan, HoursBuilder};
pub use location::{parse_city_country, CityCountry};
