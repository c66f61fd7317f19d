//! Schedule views over the registration collection.
//!
//! # Responsibility
//! - Sort, filter, remove and export over in-memory copies of records.
//! - Project records into display rows for the schedule table.
//! - Keep a working view whose sort/filter never reorders persisted data.
//!
//! # Invariants
//! - Pure helpers never mutate their input slice.
//! - Time sort is stable; unknown/empty slots order as hour `0`.
//! - Persisted order changes only through delete/clear.

use crate::config::EXPORT_FILE_NAME;
use crate::model::catalog::slot_order_key;
use crate::model::registration::{Registration, RegistrationId};
use crate::repo::registration_repo::RegistrationStore;
use crate::repo::RepoError;
use crate::service::registration_service::RegistrationService;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub use crate::model::catalog::humanize;

/// Placeholder shown when no time slot was chosen.
pub const NO_TIME_SLOT_LABEL: &str = "TBD";
/// Placeholder shown for empty fandom/notes cells.
pub const EMPTY_CELL_LABEL: &str = "-";
/// Text rendered for an empty schedule.
pub const EMPTY_SCHEDULE_MESSAGE: &str = "No sessions registered yet.";

/// Returns a copy ordered by time-slot hour. Stable for equal hours.
pub fn sort_by_time(records: &[Registration], ascending: bool) -> Vec<Registration> {
    let mut sorted = records.to_vec();
    if ascending {
        sorted.sort_by_key(|record| slot_order_key(&record.time_slot));
    } else {
        sorted.sort_by_key(|record| std::cmp::Reverse(slot_order_key(&record.time_slot)));
    }
    sorted
}

/// Returns records whose fandom equals `category`, or all records when the
/// category is empty/absent.
pub fn filter_by_fandom(records: &[Registration], category: Option<&str>) -> Vec<Registration> {
    match category.filter(|value| !value.is_empty()) {
        Some(category) => records
            .iter()
            .filter(|record| record.fandom_category == category)
            .cloned()
            .collect(),
        None => records.to_vec(),
    }
}

/// Returns a copy without the element at `index`.
///
/// An out-of-range index yields an unchanged copy.
pub fn remove(records: &[Registration], index: usize) -> Vec<Registration> {
    records
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, record)| record.clone())
        .collect()
}

/// Returns the empty collection a clear-all persists.
pub fn clear() -> Vec<Registration> {
    Vec::new()
}

/// Pretty-prints records as a JSON array with 2-space indentation.
pub fn export_json(records: &[Registration]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// One display row of the schedule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub id: RegistrationId,
    pub time: String,
    pub title: String,
    pub fandom: String,
    pub notes: String,
}

impl From<&Registration> for ScheduleRow {
    fn from(record: &Registration) -> Self {
        Self {
            id: record.id,
            time: or_placeholder(&record.time_slot, NO_TIME_SLOT_LABEL),
            title: humanize(&record.session_title),
            fandom: or_placeholder(&record.fandom_category, EMPTY_CELL_LABEL),
            notes: or_placeholder(&record.cosplay_notes, EMPTY_CELL_LABEL),
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

pub fn render_rows(records: &[Registration]) -> Vec<ScheduleRow> {
    records.iter().map(ScheduleRow::from).collect()
}

/// Renders records as an aligned plain-text table with 1-based row numbers.
pub fn render_table(records: &[Registration]) -> String {
    if records.is_empty() {
        return EMPTY_SCHEDULE_MESSAGE.to_string();
    }

    let header = ["#", "Time", "Session", "Fandom", "Notes"].map(str::to_string);
    let body: Vec<[String; 5]> = render_rows(records)
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            [
                (index + 1).to_string(),
                row.time,
                row.title,
                row.fandom,
                row.notes,
            ]
        })
        .collect();

    let mut widths = header.clone().map(|cell| cell.chars().count());
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format_line(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(body.iter().map(|cells| format_line(cells, &widths)));
    lines.join("\n")
}

fn format_line(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Error for schedule view actions.
#[derive(Debug)]
pub enum ViewError {
    /// Addressed display row does not exist.
    RowOutOfRange { index: usize, len: usize },
    Repo(RepoError),
    Export(serde_json::Error),
    Io(std::io::Error),
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowOutOfRange { index, len } => {
                write!(f, "row {index} is out of range for {len} displayed rows")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "failed to export registrations: {err}"),
            Self::Io(err) => write!(f, "failed to write export: {err}"),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RowOutOfRange { .. } => None,
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<RepoError> for ViewError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(value: serde_json::Error) -> Self {
        Self::Export(value)
    }
}

impl From<std::io::Error> for ViewError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Working schedule view over a store.
///
/// Holds an in-memory copy of the collection. Sorting reorders only the
/// copy; the fandom filter is applied on every read of `rows`/`visible`.
pub struct ScheduleView<S: RegistrationStore> {
    service: RegistrationService<S>,
    working: Vec<Registration>,
    fandom_filter: Option<String>,
    next_sort_ascending: bool,
}

impl<S: RegistrationStore> ScheduleView<S> {
    /// Loads the persisted collection into a fresh working copy.
    pub fn open(store: S) -> Result<Self, ViewError> {
        let service = RegistrationService::new(store);
        let working = service.list()?;
        info!(
            "event=schedule_open module=service status=ok count={}",
            working.len()
        );
        Ok(Self {
            service,
            working,
            fandom_filter: None,
            next_sort_ascending: true,
        })
    }

    /// Records currently displayed, after the fandom filter.
    pub fn visible(&self) -> Vec<Registration> {
        filter_by_fandom(&self.working, self.fandom_filter.as_deref())
    }

    pub fn rows(&self) -> Vec<ScheduleRow> {
        render_rows(&self.visible())
    }

    pub fn render(&self) -> String {
        render_table(&self.visible())
    }

    /// Number of displayed rows.
    pub fn total(&self) -> usize {
        self.visible().len()
    }

    pub fn fandom_filter(&self) -> Option<&str> {
        self.fandom_filter.as_deref()
    }

    /// Direction the next `toggle_sort` call applies.
    pub fn next_sort_ascending(&self) -> bool {
        self.next_sort_ascending
    }

    /// Sorts the working copy in the current direction, then flips it.
    ///
    /// Returns the direction that was applied.
    pub fn toggle_sort(&mut self) -> bool {
        let ascending = self.next_sort_ascending;
        self.sort(ascending);
        self.next_sort_ascending = !ascending;
        ascending
    }

    /// Sorts the working copy in an explicit direction.
    pub fn sort(&mut self, ascending: bool) {
        self.working = sort_by_time(&self.working, ascending);
    }

    /// Sets the fandom filter; empty or `None` shows every record.
    pub fn set_fandom_filter(&mut self, category: Option<&str>) {
        self.fandom_filter = category
            .filter(|value| !value.is_empty())
            .map(str::to_string);
    }

    /// Deletes the record shown at `row_index` (0-based, over visible rows).
    ///
    /// Exactly one entry goes: the first persisted record equal to the shown
    /// one, keeping persisted order, and the shown entry of the working copy.
    pub fn delete(&mut self, row_index: usize) -> Result<Registration, ViewError> {
        let filter = self.fandom_filter.as_deref();
        let Some(position) = self
            .working
            .iter()
            .enumerate()
            .filter(|(_, record)| filter.map_or(true, |f| record.fandom_category == f))
            .map(|(position, _)| position)
            .nth(row_index)
        else {
            return Err(ViewError::RowOutOfRange {
                index: row_index,
                len: self.total(),
            });
        };

        let target = self.working[position].clone();
        if !self.service.remove_record(&target)? {
            warn!(
                "event=schedule_delete module=service status=stale id={} reason=missing_in_store",
                target.id
            );
        }
        self.working.remove(position);
        Ok(target)
    }

    /// Clears the persisted collection and the working copy.
    pub fn clear_all(&mut self) -> Result<(), ViewError> {
        self.service.clear_all()?;
        self.working = clear();
        Ok(())
    }

    /// Pretty JSON of the displayed records.
    pub fn export_json(&self) -> Result<String, ViewError> {
        Ok(export_json(&self.visible())?)
    }

    /// Writes the displayed records to `<dir>/comiccon_registrations.json`.
    pub fn export_to_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ViewError> {
        let path = dir.as_ref().join(EXPORT_FILE_NAME);
        std::fs::write(&path, self.export_json()?)?;
        info!(
            "event=schedule_export module=service status=ok count={} path={}",
            self.total(),
            path.display()
        );
        Ok(path)
    }
}
