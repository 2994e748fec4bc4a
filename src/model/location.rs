// src/model/location.rs
use std::fmt;

use serde::Serialize;

use super::country::{resolve, Country, CountryKey};

/// A place the parcel was seen at. Every part is optional; carriers report
/// anything from a bare country to a full address.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub name: Option<String>,
    pub address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    /// `None` when no key was supplied or the key is not in the reference table.
    pub country: Option<&'static Country>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(city: impl Into<String>) -> Self {
        Self::new().with_city(city)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_postcode(mut self, postcode: impl Into<String>) -> Self {
        self.postcode = Some(postcode.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_country(mut self, key: CountryKey<'_>) -> Self {
        self.country = resolve(key);
        self
    }

    /// Alpha-2 shortcut; empty codes leave the country unresolved.
    pub fn with_country_code(self, code: &str) -> Self {
        if code.trim().is_empty() {
            return self;
        }
        self.with_country(CountryKey::Alpha2(code))
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country.map(|c| c.alpha2.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.postcode.is_none()
            && self.city.is_none()
            && self.country.is_none()
    }
}

impl fmt::Display for Location {
    /// `name, address, postcode city (CC)`, skipping absent parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let place = match (&self.postcode, &self.city) {
            (Some(p), Some(c)) => Some(join!(p, " ", c)),
            (Some(p), None) => Some(p.clone()),
            (None, Some(c)) => Some(c.clone()),
            (None, None) => None,
        };
        let parts: Vec<&str> = [self.name.as_deref(), self.address.as_deref(), place.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "{}", parts.join(", "))?;
        match (self.country, parts.is_empty()) {
            (Some(c), false) => write!(f, " ({})", c.alpha2),
            (Some(c), true) => write!(f, "{}", c.name),
            (None, true) => write!(f, "unknown location"),
            (None, false) => Ok(()),
        }
    }
}

/// A parcel shop / branch: a location plus contact data and opening hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Store {
    pub location: Location,
    /// Normalized: `Mo-Fr 08:00-12:00,13:00-18:00; Sa 09:00-12:00`.
    pub opening_hours: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location)?;
        if let Some(h) = &self.opening_hours {
            write!(f, " [{}]", h)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_available_parts() {
        let loc = Location::new().with_name("Depot").with_postcode("1010").with_city("Wien");
        assert_eq!(loc.to_string(), "Depot, 1010 Wien");
        assert_eq!(Location::new().to_string(), "unknown location");
    }

    #[test]
    fn no_country_key_means_unknown_country() {
        let loc = Location::city("Graz").with_country_code("");
        assert!(loc.country.is_none());
        assert_eq!(loc.country_code(), None);
    }
}
