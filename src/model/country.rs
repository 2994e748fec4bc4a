// src/model/country.rs
//! Process-wide country reference table.
//!
//! Loaded once, on first use, from the CSV dataset named by
//! `TrackOptions::from_env().country_table`. A missing or unreadable dataset
//! leaves the table empty: every lookup then misses and locations simply carry
//! no country.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::consts::COUNTRY_TABLE_SEP;
use crate::config::TrackOptions;
use crate::csv::parse_rows;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Country {
    pub name: String,
    pub alpha2: String,
    pub alpha3: String,
    pub numeric: u16,
}

/// Exactly one way of naming a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryKey<'a> {
    Name(&'a str),
    Alpha2(&'a str),
    Alpha3(&'a str),
    Numeric(u16),
}

#[derive(Debug, Default)]
pub struct CountryTable {
    countries: Vec<Country>,
}

impl CountryTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rows of `name,alpha2,alpha3,numeric`. A header row and rows that do not
    /// fit the shape are skipped.
    pub fn from_csv(text: &str) -> Self {
        let countries = parse_rows(text, COUNTRY_TABLE_SEP)
            .into_iter()
            .filter_map(|row| {
                let [name, a2, a3, num] = <[String; 4]>::try_from(row).ok()?;
                let numeric = num.trim().parse::<u16>().ok()?;
                Some(Country {
                    name: name.trim().to_string(),
                    alpha2: a2.trim().to_ascii_uppercase(),
                    alpha3: a3.trim().to_ascii_uppercase(),
                    numeric,
                })
            })
            .collect();
        Self { countries }
    }

    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                let table = Self::from_csv(&text);
                debug!(path = %path.display(), countries = table.len(), "country table loaded");
                table
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "country table unavailable; lookups will miss");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn lookup(&self, key: CountryKey<'_>) -> Option<&Country> {
        match key {
            CountryKey::Name(n) => {
                let n = n.trim();
                self.countries.iter().find(|c| c.name.eq_ignore_ascii_case(n))
            }
            CountryKey::Alpha2(code) => {
                let code = code.trim();
                self.countries.iter().find(|c| c.alpha2.eq_ignore_ascii_case(code))
            }
            CountryKey::Alpha3(code) => {
                let code = code.trim();
                self.countries.iter().find(|c| c.alpha3.eq_ignore_ascii_case(code))
            }
            CountryKey::Numeric(num) => self.countries.iter().find(|c| c.numeric == num),
        }
    }
}

static TABLE: OnceLock<CountryTable> = OnceLock::new();

/// The shared table, loading it on first call.
pub fn countries() -> &'static CountryTable {
    TABLE.get_or_init(|| CountryTable::load(&TrackOptions::from_env().country_table))
}

/// Install a table before first use. Returns `false` if one is already loaded.
pub fn install(table: CountryTable) -> bool {
    TABLE.set(table).is_ok()
}

pub fn resolve(key: CountryKey<'_>) -> Option<&'static Country> {
    countries().lookup(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "name,alpha2,alpha3,numeric\nAustria,AT,AUT,040\nGermany,DE,DEU,276\nbroken,row\n";

    #[test]
    fn parses_and_looks_up_by_every_key() {
        let t = CountryTable::from_csv(SAMPLE);
        assert_eq!(t.len(), 2);
        assert_eq!(t.lookup(CountryKey::Alpha2("at")).map(|c| c.numeric), Some(40));
        assert_eq!(t.lookup(CountryKey::Alpha3("DEU")).map(|c| c.alpha2.as_str()), Some("DE"));
        assert_eq!(t.lookup(CountryKey::Numeric(276)).map(|c| c.name.as_str()), Some("Germany"));
        assert_eq!(t.lookup(CountryKey::Name("austria")).map(|c| c.alpha3.as_str()), Some("AUT"));
        assert!(t.lookup(CountryKey::Alpha2("FR")).is_none());
    }

    #[test]
    fn missing_dataset_is_empty_not_an_error() {
        let t = CountryTable::load(Path::new("no/such/country-codes.csv"));
        assert!(t.is_empty());
        assert!(t.lookup(CountryKey::Alpha2("AT")).is_none());
    }
}
