//! JSON output consumed by the timetable generator.
//!
//! Entities are projected onto view types holding only presentation fields, so join
//! keys (`id`, `course_id`, `semester_id`) never reach the file. View fields are declared
//! in lexical order, which makes every object in the document come out with sorted keys.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::kos::{ClockTime, Course, KosError, Parallel, ParallelKind, TimetableEvent, WeekParity};
use crate::timer::Stopwatch;

#[derive(Debug, Serialize)]
pub struct EventView<'a> {
    day: u8,
    end: ClockTime,
    room: Option<&'a str>,
    start: ClockTime,
    week: Option<WeekParity>,
    weeks_valid: &'a [u32],
}

#[derive(Debug, Serialize)]
pub struct ParallelView<'a> {
    can_register: bool,
    capacity: Option<u32>,
    is_full: bool,
    num: Option<u32>,
    occupied_places: Option<u32>,
    timetable: Vec<EventView<'a>>,
    #[serde(rename = "type")]
    kind: ParallelKind,
}

#[derive(Debug, Serialize)]
pub struct CourseView<'a> {
    code: &'a str,
    name: &'a str,
    parallels: Vec<ParallelView<'a>>,
}

impl<'a> From<&'a TimetableEvent> for EventView<'a> {
    fn from(event: &'a TimetableEvent) -> Self {
        Self {
            day: event.day_of_week,
            end: event.end,
            room: event.room.as_deref(),
            start: event.start,
            week: event.week,
            weeks_valid: &event.weeks_valid,
        }
    }
}

impl<'a> From<&'a Parallel> for ParallelView<'a> {
    fn from(parallel: &'a Parallel) -> Self {
        Self {
            can_register: parallel.can_register,
            capacity: parallel.capacity,
            is_full: parallel.is_full,
            num: parallel.number,
            occupied_places: parallel.occupied,
            timetable: parallel.timetable.iter().map(EventView::from).collect(),
            kind: parallel.kind,
        }
    }
}

impl<'a> From<&'a Course> for CourseView<'a> {
    fn from(course: &'a Course) -> Self {
        Self {
            code: &course.code,
            name: &course.name,
            parallels: course.parallels.iter().map(ParallelView::from).collect(),
        }
    }
}

/// Course lists keyed by semester id.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct OutputDocument<'a> {
    semesters: BTreeMap<&'a str, Vec<CourseView<'a>>>,
}

impl<'a> OutputDocument<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the course list of one semester.
    pub fn insert(&mut self, semester_id: &'a str, courses: &'a [Course]) {
        self.semesters
            .insert(semester_id, courses.iter().map(CourseView::from).collect());
    }

    pub fn to_json(&self) -> Result<String, KosError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serializes `document` and writes it to `path`.
pub async fn write_output(path: &Path, document: &OutputDocument<'_>) -> Result<(), KosError> {
    let watch = Stopwatch::start();
    let json = document.to_json()?;

    tokio::fs::write(path, json.as_bytes())
        .await
        .map_err(|source| KosError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), bytes = json.len(), elapsed = %watch.elapsed(), "Saved file");
    Ok(())
}
