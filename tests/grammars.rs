// tests/grammars.rs
use parcelwatch::error::GrammarError;
use parcelwatch::grammar::{parse_city_country, parse_opening_hours, DaySpan, HoursBuilder};

use chrono::Weekday;

#[test]
fn city_with_country_suffix() {
    let cc = parse_city_country("Wiener Neudorf (AT)").unwrap();
    assert_eq!(cc.city, "Wiener Neudorf");
    assert_eq!(cc.country_code.as_deref(), Some("AT"));

    let cc = parse_city_country("Hamburg").unwrap();
    assert_eq!(cc.city, "Hamburg");
    assert_eq!(cc.country_code, None);

    let cc = parse_city_country("Frankfurt (Oder)").unwrap();
    assert_eq!(cc.city, "Frankfurt (Oder)");
    assert_eq!(cc.country_code, None);
}

#[test]
fn broken_suffixes_are_rejected() {
    for bad in ["", "Vienna (A)", "Graz (at)", "Graz (AUT)", "Graz (AT", "(AT)"] {
        assert!(
            matches!(parse_city_country(bad), Err(GrammarError::Location(_))),
            "{:?} should be rejected",
            bad
        );
    }
}

#[test]
fn hours_with_sentinel_and_annual_closing() {
    let raw = "Mo. - Fr.: #08:00 - 12:00#13:00 - 18:00|Sa.: #09:00 - 12:00|So.: #--:-- - --:--|Jahressperre: 24.12.2020 - 26.12.2020";
    assert_eq!(
        parse_opening_hours(raw).unwrap(),
        "Mo-Fr 08:00-12:00,13:00-18:00; Sa 09:00-12:00"
    );
}

#[test]
fn sentinel_removes_the_previous_range() {
    let raw = "Mo.: #09:00 - 12:00#13:00 - 18:00|Tu.: #--:-- - --:--";
    assert_eq!(parse_opening_hours(raw).unwrap(), "Mo 09:00-12:00,13:00-18:00");

    let raw = "Mo.: #09:00 - 12:00#--:-- - --:--";
    assert_eq!(parse_opening_hours(raw).unwrap(), "");
}

#[test]
fn garbage_tokens_fail() {
    assert!(parse_opening_hours("Mo.: #nine to five").is_err());
    assert!(matches!(parse_opening_hours("Xy.: #09:00 - 12:00"), Err(GrammarError::Day(_))));
}

#[test]
fn builder_matches_grammar_output() {
    let mut hours = HoursBuilder::new();
    hours.open_day(DaySpan { first: Weekday::Mon, last: Some(Weekday::Fri) });
    hours.add_range_str("8:00", "12:00").unwrap();
    hours.add_range_str("13:00:00", "18:00:00").unwrap();
    hours.open_day(DaySpan::single(Weekday::Sun));
    assert_eq!(hours.render(), "Mo-Fr 08:00-12:00,13:00-18:00");
}
