use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};

/// A calendar day identifying one journal entry, written `YYYY-MM-DD`.
///
/// Ordering is chronological, which coincides with the lexicographic order
/// of the fixed-width string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wrap a date. Years outside 0000..=9999 have no four-digit form.
    pub fn from_date(date: NaiveDate) -> CoreResult<Self> {
        if (0..=9999).contains(&date.year()) {
            Ok(Self(date))
        } else {
            Err(CoreError::InvalidDateKey(date.to_string()))
        }
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| CoreError::InvalidDateKey(format!("{year:04}-{month:02}-{day:02}")))
            .and_then(Self::from_date)
    }

    /// Parse the canonical form. Anything but exactly `YYYY-MM-DD` naming a
    /// real calendar day is rejected.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidDateKey(s.to_string());
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(invalid());
        }

        let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[5..7].parse().map_err(|_| invalid())?;
        let day: u32 = s[8..10].parse().map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }

    /// The current day in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), self.0.month(), self.0.day())
    }
}

impl FromStr for DateKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let key = DateKey::parse("2024-03-01").unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 3);
        assert_eq!(key.day(), 1);
        assert_eq!(key.to_string(), "2024-03-01");
    }

    #[test]
    fn display_zero_pads() {
        let key = DateKey::from_ymd(987, 1, 2).unwrap();
        assert_eq!(key.to_string(), "0987-01-02");
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in [
            "2024-3-01",
            "2024-03-1",
            "24-03-01",
            "2024/03/01",
            "2024-03-01 ",
            " 2024-03-01",
            "2024-03-01T00:00",
            "abcd-ef-gh",
            "+024-03-01",
            "",
        ] {
            assert!(DateKey::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(DateKey::parse("2023-02-29").is_err());
        assert!(DateKey::parse("2024-13-01").is_err());
        assert!(DateKey::parse("2024-00-10").is_err());
        assert!(DateKey::parse("2024-02-29").is_ok());
    }

    #[test]
    fn from_date_rejects_five_digit_years() {
        let date = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(DateKey::from_date(date).is_err());
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let mut keys: Vec<DateKey> = ["2024-01-20", "2023-12-31", "2024-01-05"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let mut strings = rendered.clone();
        strings.sort();
        assert_eq!(rendered, strings);
        assert_eq!(rendered[0], "2023-12-31");
    }

    #[test]
    fn serde_uses_string_form() {
        let key = DateKey::parse("2024-01-05").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-01-05\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<DateKey>("\"2024-1-5\"").is_err());
    }
}
