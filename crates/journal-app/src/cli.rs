use std::path::PathBuf;

use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use journal_core::{DateKey, Direction};

#[derive(Parser)]
#[command(name = "journal", about = "Dated journal entries, encrypted at rest")]
pub struct Cli {
    /// Path to config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Journal file, overriding the configured path
    #[arg(long)]
    pub journal: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty journal
    New {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Write the entry for a date; reads stdin when --text is omitted
    Write {
        #[arg(long)]
        date: Option<DateKey>,
        #[arg(long)]
        text: Option<String>,
    },

    /// Print the entry for a date
    Read {
        #[arg(long)]
        date: Option<DateKey>,
    },

    /// Delete the entry for a date
    Remove {
        #[arg(long)]
        date: DateKey,
    },

    /// List all entries
    List {
        #[arg(long)]
        json: bool,
    },

    /// Find the target date for first, previous, today, next or last
    Nav {
        #[arg(value_parser = direction_parser())]
        direction: Direction,
        /// Reference date, defaults to today
        #[arg(long)]
        from: Option<DateKey>,
    },

    /// Show which days of a month have entries
    Calendar {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },

    /// Summarize the journal
    Info,
}

fn direction_parser() -> impl TypedValueParser<Value = Direction> {
    PossibleValuesParser::new([
        PossibleValue::new("first"),
        PossibleValue::new("previous").alias("prev"),
        PossibleValue::new("today"),
        PossibleValue::new("next"),
        PossibleValue::new("last"),
    ])
    .try_map(|s| s.parse::<Direction>())
}

fn parse_month(s: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("invalid month {s:?}: expected YYYY-MM");
    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parsing() {
        assert_eq!(parse_month("2024-02"), Ok((2024, 2)));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-2").is_err());
        assert!(parse_month("202402").is_err());
    }

    #[test]
    fn parses_nav_command() {
        let cli = Cli::try_parse_from(["journal", "nav", "previous", "--from", "2024-01-15"]).unwrap();
        match cli.command {
            Commands::Nav { direction, from } => {
                assert_eq!(direction, Direction::Previous);
                assert_eq!(from.unwrap().to_string(), "2024-01-15");
            }
            _ => panic!("expected nav"),
        }
    }

    #[test]
    fn nav_accepts_prev_alias() {
        let cli = Cli::try_parse_from(["journal", "nav", "prev"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Nav { direction: Direction::Previous, from: None }
        ));
    }

    #[test]
    fn nav_lists_directions_on_bad_input() {
        let err = Cli::try_parse_from(["journal", "nav", "sideways"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        assert!(
            err.to_string().contains("first, previous, today, next, last"),
            "{err}"
        );
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(Cli::try_parse_from(["journal", "read", "--date", "2024-1-5"]).is_err());
    }
}
