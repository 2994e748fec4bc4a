// src/config/options.rs
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;

/// Knobs handed to carrier adapters and through them to the fetch collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackOptions {
    /// Request timeout; opaque to the core, forwarded with every request.
    pub timeout: Duration,
    /// Language code substituted into endpoint URLs.
    pub lang: String,
    /// Country reference dataset (CSV: name,alpha2,alpha3,numeric).
    pub country_table: PathBuf,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            lang: s!(DEFAULT_LANG),
            country_table: PathBuf::from(COUNTRY_TABLE_PATH),
        }
    }
}

impl TrackOptions {
    /// Defaults overridden by `PARCELWATCH_*` variables. Unparseable values
    /// fall back to the default.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(secs) = env::var(ENV_TIMEOUT_SECS).ok().and_then(|v| v.trim().parse::<u64>().ok()) {
            opts.timeout = Duration::from_secs(secs);
        }
        if let Ok(lang) = env::var(ENV_LANG) {
            if !lang.trim().is_empty() { opts.lang = lang.trim().to_ascii_lowercase(); }
        }
        if let Some(path) = env::var_os(ENV_COUNTRIES) {
            opts.country_table = PathBuf::from(path);
        }
        opts
    }

    /// Fill an endpoint template.
    pub fn url(&self, template: &str, number: &str) -> String {
        template
            .replace("{lang}", &self.lang)
            .replace("{n}", number)
            .replace("{id}", number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_templates() {
        let opts = TrackOptions::default();
        assert_eq!(
            opts.url(DPD_TRACKING_URL, "01234567890123"),
            "https://tracking.dpd.de/rest/plc/en_US/01234567890123"
        );
        assert_eq!(opts.timeout, Duration::from_secs(15));
    }
}
