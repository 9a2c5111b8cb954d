//! Date-to-partition resolution.
//!
//! Maps a calendar date to its storage partition: year, month, and a
//! week-of-month bucket. The bucket rule is fixed: days 1-7 are Week-1,
//! 8-14 Week-2, 15-21 Week-3, and 22 through month end Week-4. Tail days
//! past 28 stay in Week-4; a month never has a fifth bucket and never
//! borrows from its neighbours.

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Content category within a week partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Notes,
    Tasks,
    Meetings,
    Progress,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Meetings,
        Category::Tasks,
        Category::Progress,
        Category::Notes,
    ];

    /// Folder name inside the week partition.
    pub fn folder(&self) -> &'static str {
        match self {
            Category::Notes => "Notes",
            Category::Tasks => "Tasks",
            Category::Meetings => "Meetings",
            Category::Progress => "Progress",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder())
    }
}

/// A resolved storage partition: `YYYY/MM/Week-N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub year: i32,
    pub month: u32,
    pub week: u32,
}

impl Partition {
    /// Resolve a calendar date to its partition.
    ///
    /// Pure and total for any valid date.
    pub fn resolve(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
            week: week_of_month(date.day()),
        }
    }

    /// Relative path of the week folder: `YYYY/MM/Week-N`.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(format!("{:04}", self.year))
            .join(format!("{:02}", self.month))
            .join(format!("Week-{}", self.week))
    }

    /// Relative path of a category folder inside the week.
    pub fn subpath(&self, category: Category) -> PathBuf {
        self.relative_path().join(category.folder())
    }
}

/// Week-of-month bucket for a day-of-month, clamped to four buckets.
pub fn week_of_month(day: u32) -> u32 {
    ((day - 1) / 7 + 1).min(4)
}

/// Parse a `YYYY-MM-DD` date string, defaulting to today.
///
/// Malformed or empty input falls back to the current local date rather
/// than failing the whole turn.
pub fn parse_date(input: Option<&str>) -> NaiveDate {
    match input {
        Some(raw) if !raw.trim().is_empty() => {
            match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!(input = raw, error = %e, "Invalid date; defaulting to today");
                    Local::now().date_naive()
                }
            }
        }
        _ => Local::now().date_naive(),
    }
}
