//! Nearest-entry navigation over a sparse, ascending set of date keys.
//!
//! Every function here is pure: the caller passes the journal's current
//! key list (ascending, no duplicates) and a reference date.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::date_key::DateKey;
use crate::error::CoreError;

/// What `previous` does when the reference date precedes every entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousBeforeFirst {
    /// There is nothing earlier, so stay put.
    #[default]
    Stop,
    /// Jump to the earliest entry, as older releases did.
    First,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    First,
    Previous,
    Today,
    Next,
    Last,
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "previous" | "prev" => Ok(Self::Previous),
            "today" => Ok(Self::Today),
            "next" => Ok(Self::Next),
            "last" => Ok(Self::Last),
            other => Err(CoreError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::First => "first",
            Self::Previous => "previous",
            Self::Today => "today",
            Self::Next => "next",
            Self::Last => "last",
        };
        f.write_str(s)
    }
}

pub fn first(keys: &[DateKey]) -> Option<DateKey> {
    keys.first().copied()
}

pub fn last(keys: &[DateKey]) -> Option<DateKey> {
    keys.last().copied()
}

pub fn today() -> DateKey {
    DateKey::today()
}

/// The entry before `reference`, with the default [`PreviousBeforeFirst::Stop`] policy.
pub fn previous(keys: &[DateKey], reference: DateKey) -> Option<DateKey> {
    Navigator::default().previous(keys, reference)
}

/// The entry after `reference`, or the least key after it when it has no entry.
pub fn next(keys: &[DateKey], reference: DateKey) -> Option<DateKey> {
    Navigator::default().next(keys, reference)
}

/// Navigation with a configured edge-case policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Navigator {
    before_first: PreviousBeforeFirst,
}

impl Navigator {
    pub fn new(before_first: PreviousBeforeFirst) -> Self {
        Self { before_first }
    }

    pub fn previous(&self, keys: &[DateKey], reference: DateKey) -> Option<DateKey> {
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys must be ascending");
        match keys.binary_search(&reference) {
            Ok(0) => None,
            Ok(i) => Some(keys[i - 1]),
            Err(0) => match self.before_first {
                PreviousBeforeFirst::Stop => None,
                PreviousBeforeFirst::First => first(keys),
            },
            Err(i) => Some(keys[i - 1]),
        }
    }

    pub fn next(&self, keys: &[DateKey], reference: DateKey) -> Option<DateKey> {
        debug_assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys must be ascending");
        match keys.binary_search(&reference) {
            Ok(i) => keys.get(i + 1).copied(),
            Err(i) => keys.get(i).copied(),
        }
    }

    /// Resolve a direction to a target date. `Today` ignores the keys.
    pub fn go(&self, direction: Direction, keys: &[DateKey], reference: DateKey) -> Option<DateKey> {
        match direction {
            Direction::First => first(keys),
            Direction::Previous => self.previous(keys, reference),
            Direction::Today => Some(today()),
            Direction::Next => self.next(keys, reference),
            Direction::Last => last(keys),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn sample() -> Vec<DateKey> {
        vec![key("2024-01-05"), key("2024-01-10"), key("2024-01-20")]
    }

    #[test]
    fn first_and_last() {
        let keys = sample();
        assert_eq!(first(&keys), Some(key("2024-01-05")));
        assert_eq!(last(&keys), Some(key("2024-01-20")));
        assert_eq!(first(&[]), None);
        assert_eq!(last(&[]), None);
    }

    #[test]
    fn previous_from_existing_entry() {
        let keys = sample();
        assert_eq!(previous(&keys, key("2024-01-10")), Some(key("2024-01-05")));
        assert_eq!(previous(&keys, key("2024-01-20")), Some(key("2024-01-10")));
    }

    #[test]
    fn previous_from_first_entry_is_none() {
        assert_eq!(previous(&sample(), key("2024-01-05")), None);
    }

    #[test]
    fn previous_between_entries_is_nearest_lower() {
        assert_eq!(previous(&sample(), key("2024-01-15")), Some(key("2024-01-10")));
    }

    #[test]
    fn previous_after_all_entries_is_last() {
        assert_eq!(previous(&sample(), key("2024-02-01")), Some(key("2024-01-20")));
    }

    #[test]
    fn previous_before_all_entries_depends_on_policy() {
        let keys = sample();
        let reference = key("2024-01-01");
        assert_eq!(previous(&keys, reference), None);
        let legacy = Navigator::new(PreviousBeforeFirst::First);
        assert_eq!(legacy.previous(&keys, reference), Some(key("2024-01-05")));
    }

    #[test]
    fn next_from_existing_entry() {
        assert_eq!(next(&sample(), key("2024-01-10")), Some(key("2024-01-20")));
    }

    #[test]
    fn next_from_last_entry_is_none() {
        assert_eq!(next(&sample(), key("2024-01-20")), None);
    }

    #[test]
    fn next_before_all_entries_is_first() {
        assert_eq!(next(&sample(), key("2024-01-01")), Some(key("2024-01-05")));
    }

    #[test]
    fn next_between_entries_is_nearest_higher() {
        assert_eq!(next(&sample(), key("2024-01-11")), Some(key("2024-01-20")));
    }

    #[test]
    fn next_after_all_entries_is_none() {
        assert_eq!(next(&sample(), key("2024-03-01")), None);
    }

    #[test]
    fn empty_keys_navigate_nowhere() {
        let nav = Navigator::new(PreviousBeforeFirst::First);
        assert_eq!(nav.previous(&[], key("2024-01-01")), None);
        assert_eq!(nav.next(&[], key("2024-01-01")), None);
    }

    #[test]
    fn go_dispatches_directions() {
        let keys = sample();
        let nav = Navigator::default();
        let reference = key("2024-01-10");
        assert_eq!(nav.go(Direction::First, &keys, reference), Some(key("2024-01-05")));
        assert_eq!(nav.go(Direction::Previous, &keys, reference), Some(key("2024-01-05")));
        assert_eq!(nav.go(Direction::Next, &keys, reference), Some(key("2024-01-20")));
        assert_eq!(nav.go(Direction::Last, &keys, reference), Some(key("2024-01-20")));
        assert!(nav.go(Direction::Today, &keys, reference).is_some());
    }

    #[test]
    fn direction_parses_and_displays() {
        assert_eq!("prev".parse::<Direction>().unwrap(), Direction::Previous);
        assert_eq!(Direction::Today.to_string(), "today");
        assert!("sideways".parse::<Direction>().is_err());
    }
}
