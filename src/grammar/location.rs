// src/grammar/location.rs
use std::sync::OnceLock;

use regex::Regex;

use crate::error::GrammarError;
use crate::model::Location;

/// `"<city> (<CC>)"` split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCountry {
    pub city: String,
    pub country_code: Option<String>,
}

impl CityCountry {
    pub fn into_location(self) -> Location {
        let loc = Location::city(self.city);
        match self.country_code {
            Some(cc) => loc.with_country_code(&cc),
            None => loc,
        }
    }
}

fn full_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+) \(([A-Z]{2})\)$").unwrap())
}

// A country-code-like trailer that is not a proper "(CC)". Longer groups
// such as "(Oder)" are part of the city name.
fn suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([A-Za-z]{0,3}\)?$").unwrap())
}

pub fn parse_city_country(input: &str) -> Result<CityCountry, GrammarError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(GrammarError::Location(s!(input)));
    }
    if let Some(caps) = full_re().captures(s) {
        return Ok(CityCountry {
            city: caps[1].trim().to_string(),
            country_code: Some(caps[2].to_string()),
        });
    }
    if suffix_re().is_match(s) {
        return Err(GrammarError::Location(s!(input)));
    }
    Ok(CityCountry { city: s!(s), country_code: None })
}
