use chrono::{Local, TimeZone};

use crate::types::Fork;

/// Table headers and their fixed widths, in display order.
pub const COLUMNS: [(&str, u16); 6] = [
    ("Repo", 30),
    ("Stars", 10),
    ("Ahead", 10),
    ("Behind", 10),
    ("Updated", 15),
    ("Forks", 10),
];

/// Display cells for one fork, in [`COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkRow {
    pub cells: [String; 6],
}

/// Project a page of forks into table rows, dates in the local time zone.
pub fn project(forks: &[Fork]) -> Vec<ForkRow> {
    project_in(forks, &Local)
}

pub fn project_in<Tz>(forks: &[Fork], tz: &Tz) -> Vec<ForkRow>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    forks
        .iter()
        .map(|fork| ForkRow {
            cells: [
                fork.full_name.clone(),
                fork.stars.to_string(),
                fork.ahead_by.to_string(),
                fork.behind_by.to_string(),
                fork.updated_at
                    .with_timezone(tz)
                    .format("%Y-%m-%d")
                    .to_string(),
                fork.forks.to_string(),
            ],
        })
        .collect()
}
