// src/config/consts.rs

// Fetch
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LANG: &str = "en";

// Reference data
pub const COUNTRY_TABLE_PATH: &str = "data/country-codes.csv";
pub const COUNTRY_TABLE_SEP: char = ',';

// Environment overrides
pub const ENV_TIMEOUT_SECS: &str = "PARCELWATCH_TIMEOUT_SECS";
pub const ENV_LANG: &str = "PARCELWATCH_LANG";
pub const ENV_COUNTRIES: &str = "PARCELWATCH_COUNTRIES";

// Endpoints ({n} = tracking number, {id} = store id, {lang} = language)
pub const DHL_TRACKING_URL: &str = "https://nolp.dhl.de/nextt-online-public/set_identcodes.do?lang={lang}&idc={n}";
pub const DHL_LINK: &str = "https://nolp.dhl.de/nextt-online-public/set_identcodes.do?idc={n}";

pub const DPD_TRACKING_URL: &str = "https://tracking.dpd.de/rest/plc/en_US/{n}";
pub const DPD_STORE_URL: &str = "https://tracking.dpd.de/rest/ps/en_US/{id}";
pub const DPD_LINK: &str = "https://tracking.dpd.de/parcelstatus?query={n}";

pub const GLS_TRACKING_URL: &str = "https://gls-group.eu/app/service/open/rest/EU/{lang}/rstt001?caller=witt002&match={n}";
pub const GLS_LINK: &str = "https://gls-group.eu/EU/en/parcel-tracking?match={n}";

pub const HERMES_TRACKING_URL: &str = "https://tracking.hermesworld.com/SISYRestAPIWebApp/V1/sisy-rs/GetHistoryByID?id={n}&lng={lang}&callback=parcelwatch";
pub const HERMES_LINK: &str = "https://tracking.hermesworld.com/?TrackID={n}";

pub const POST_AT_TRACKING_URL: &str = "https://www.post.at/sendungsverfolgung.php/details?pnum1={n}&lang={lang}";
pub const POST_AT_STORE_URL: &str = "https://www.post.at/sendungsverfolgung.php/branch?pnum1={id}&lang={lang}";
pub const POST_AT_LINK: &str = "https://www.post.at/sendungsverfolgung.php/details?pnum1={n}";
