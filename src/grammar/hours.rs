// src/grammar/hours.rs
//! Opening-hours mini-language.
//!
//! Input is a `|`-separated list of tokens:
//!
//! ```text
//! Mo. - Fr.: #08:00 - 12:00#13:00 - 18:00|Sa.: #09:00 - 12:00|So.: #--:-- - --:--
//! ```
//!
//! A day label opens a group, each `#HH:MM - HH:MM` adds a range to the open
//! group, and `#--:-- - --:--` takes the group's last range back out. Annual
//! closing periods (`Jahressperre: 24.12.2020 - 26.12.2020`) are recognized
//! and dropped. Output is `Mo-Fr 08:00-12:00,13:00-18:00; Sa 09:00-12:00`;
//! groups left without ranges are omitted.

use std::sync::OnceLock;

use chrono::{NaiveTime, Weekday};
use regex::Regex;

use crate::error::GrammarError;

const DAY_LABELS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

const DAY_NAMES: &[(&str, Weekday)] = &[
    ("mo", Weekday::Mon), ("mon", Weekday::Mon), ("monday", Weekday::Mon), ("montag", Weekday::Mon),
    ("tu", Weekday::Tue), ("tue", Weekday::Tue), ("tuesday", Weekday::Tue), ("di", Weekday::Tue), ("dienstag", Weekday::Tue),
    ("we", Weekday::Wed), ("wed", Weekday::Wed), ("wednesday", Weekday::Wed), ("mi", Weekday::Wed), ("mittwoch", Weekday::Wed),
    ("th", Weekday::Thu), ("thu", Weekday::Thu), ("thursday", Weekday::Thu), ("do", Weekday::Thu), ("donnerstag", Weekday::Thu),
    ("fr", Weekday::Fri), ("fri", Weekday::Fri), ("friday", Weekday::Fri), ("freitag", Weekday::Fri),
    ("sa", Weekday::Sat), ("sat", Weekday::Sat), ("saturday", Weekday::Sat), ("samstag", Weekday::Sat),
    ("su", Weekday::Sun), ("sun", Weekday::Sun), ("sunday", Weekday::Sun), ("so", Weekday::Sun), ("sonntag", Weekday::Sun),
];

pub fn weekday(name: &str) -> Result<Weekday, GrammarError> {
    let key = name.trim().trim_end_matches('.').to_lowercase();
    DAY_NAMES
        .iter()
        .find(|(n, _)| *n == key)
        .map(|&(_, d)| d)
        .ok_or_else(|| GrammarError::Day(s!(name)))
}

/// ISO weekday number, Monday = 1.
pub fn weekday_from_number(n: u64) -> Option<Weekday> {
    const WEEK: [Weekday; 7] = [
        Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun,
    ];
    WEEK.get(usize::try_from(n).ok()?.checked_sub(1)?).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub first: Weekday,
    pub last: Option<Weekday>,
}

impl DaySpan {
    pub fn single(day: Weekday) -> Self {
        Self { first: day, last: None }
    }

    fn label(&self) -> String {
        let first = DAY_LABELS[self.first.num_days_from_monday() as usize];
        match self.last {
            Some(last) if last != self.first => {
                join!(first, "-", DAY_LABELS[last.num_days_from_monday() as usize])
            }
            _ => s!(first),
        }
    }
}

/// Accumulates day groups; shared by every carrier that reports hours.
#[derive(Debug, Default)]
pub struct HoursBuilder {
    groups: Vec<(DaySpan, Vec<(NaiveTime, NaiveTime)>)>,
}

impl HoursBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_day(&mut self, span: DaySpan) {
        self.groups.push((span, Vec::new()));
    }

    /// Add a range to the most recently opened group. Fails when none is open.
    pub fn add_range(&mut self, from: NaiveTime, to: NaiveTime) -> Result<(), GrammarError> {
        let (_, ranges) = self
            .groups
            .last_mut()
            .ok_or_else(|| GrammarError::Hours(format!("{}-{} before any day", from, to)))?;
        ranges.push((from, to));
        Ok(())
    }

    /// `"08:00"`, `"8:00"` or `"08:00:00"` pair.
    pub fn add_range_str(&mut self, from: &str, to: &str) -> Result<(), GrammarError> {
        self.add_range(parse_time(from)?, parse_time(to)?)
    }

    /// Sentinel handling: drop the last range of the open group, if any.
    pub fn pop_range(&mut self) {
        if let Some((_, ranges)) = self.groups.last_mut() {
            ranges.pop();
        }
    }

    pub fn render(&self) -> String {
        self.groups
            .iter()
            .filter(|(_, ranges)| !ranges.is_empty())
            .map(|(span, ranges)| {
                let ranges: Vec<String> = ranges
                    .iter()
                    .map(|(a, b)| format!("{}-{}", a.format("%H:%M"), b.format("%H:%M")))
                    .collect();
                format!("{} {}", span.label(), ranges.join(","))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, GrammarError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| GrammarError::Hours(s!(s)))
}

fn day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\p{L}+)\.?(?:\s*-\s*(\p{L}+)\.?)?\s*:\s*").unwrap()
    })
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})$").unwrap())
}

fn closed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^--:--\s*-\s*--:--$").unwrap())
}

// Optional label, then a dd.mm.[yyyy] - dd.mm.[yyyy] period.
fn annual_closing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:[^:#]*:\s*)?\d{1,2}\.\d{1,2}\.(?:\d{2,4})?\s*-\s*\d{1,2}\.\d{1,2}\.(?:\d{2,4})?$",
        )
        .unwrap()
    })
}

pub fn parse_opening_hours(input: &str) -> Result<String, GrammarError> {
    let mut hours = HoursBuilder::new();

    for token in input.split('|') {
        let token = token.trim();
        if token.is_empty() || annual_closing_re().is_match(token) {
            continue;
        }

        let mut rest = token;
        if let Some(caps) = day_re().captures(token) {
            let first = weekday(&caps[1])?;
            let last = caps.get(2).map(|m| weekday(m.as_str())).transpose()?;
            hours.open_day(DaySpan { first, last });
            rest = &token[caps[0].len()..];
        }

        let mut pieces = rest.split('#');
        if pieces.next().is_some_and(|lead| !lead.trim().is_empty()) {
            return Err(GrammarError::Hours(s!(token)));
        }
        for piece in pieces {
            let piece = piece.trim();
            if closed_re().is_match(piece) {
                hours.pop_range();
            } else if let Some(caps) = range_re().captures(piece) {
                hours.add_range_str(&caps[1], &caps[2])?;
            } else {
                return Err(GrammarError::Hours(s!(piece)));
            }
        }
    }

    Ok(hours.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_day_and_closed_day() {
        let out = parse_opening_hours("Mo.: #09:00 - 12:00#13:00 - 18:00|Tu.: #--:-- - --:--").unwrap();
        assert_eq!(out, "Mo 09:00-12:00,13:00-18:00");
    }

    #[test]
    fn sentinel_overrides_previous_range() {
        let out = parse_opening_hours("Mo. - Fr.:#08:00 - 18:00|Sa.: #09:00 - 12:00#--:-- - --:--").unwrap();
        assert_eq!(out, "Mo-Fr 08:00-18:00");
    }

    #[test]
    fn german_labels_and_annual_closing() {
        let out = parse_opening_hours(
            "Di. - Do.: #8:00 - 12:30|So.: #10:00 - 11:00|Jahressperre: 24.12.2020 - 06.01.2021",
        )
        .unwrap();
        assert_eq!(out, "Tu-Th 08:00-12:30; Su 10:00-11:00");
    }

    #[test]
    fn strict_on_unknown_tokens() {
        assert!(matches!(parse_opening_hours("Mo.: #9 to 5"), Err(GrammarError::Hours(_))));
        assert!(matches!(parse_opening_hours("Xy.: #09:00 - 10:00"), Err(GrammarError::Day(_))));
        assert!(parse_opening_hours("#09:00 - 10:00").is_err());
        assert!(parse_opening_hours("Mo.: always").is_err());
    }

    #[test]
    fn builder_single_day() {
        let mut b = HoursBuilder::new();
        b.open_day(DaySpan::single(Weekday::Sat));
        b.add_range_str("09:00:00", "13:00").unwrap();
        assert_eq!(b.render(), "Sa 09:00-13:00");
        assert_eq!(weekday_from_number(7), Some(Weekday::Sun));
        assert_eq!(weekday_from_number(0), None);
    }
}
