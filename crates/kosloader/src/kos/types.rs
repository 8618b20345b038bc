/// Types for semesters, courses and timetable parallels
use chrono::NaiveDate;
use serde::Serialize;

/// An academic term with its date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semester {
    pub id: String,
    pub name: String,
    /// `NaiveDate::MIN` when the API does not report the boundary
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Semester {
    /// Returns true if `date` falls inside `[start, end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Kind of a parallel, serialized with the KOS type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParallelKind {
    #[serde(rename = "P")]
    Lecture,
    #[serde(rename = "C")]
    Tutorial,
    #[serde(rename = "L")]
    Lab,
}

impl ParallelKind {
    /// Maps a KOS `parallelType.code` to the kind.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(ParallelKind::Lecture),
            "C" => Some(ParallelKind::Tutorial),
            "L" => Some(ParallelKind::Lab),
            _ => None,
        }
    }
}

/// Week parity of a timetable event.
///
/// Serialized as the Czech initials the timetable front-end expects:
/// `L` (lichý, odd) and `S` (sudý, even).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WeekParity {
    #[serde(rename = "L")]
    Odd,
    #[serde(rename = "S")]
    Even,
}

impl WeekParity {
    /// Maps a KOS `evenOddWeek` value. Values meaning "every week" map to `None`.
    pub fn from_api(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ODD" | "L" => Some(WeekParity::Odd),
            "EVEN" | "S" => Some(WeekParity::Even),
            _ => None,
        }
    }
}

/// `(hour, minute)`
pub type ClockTime = (u8, u8);

/// A single weekly slot of a parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEvent {
    pub day_of_week: u8,
    pub week: Option<WeekParity>,
    pub weeks_valid: Vec<u32>,
    pub start: ClockTime,
    pub end: ClockTime,
    pub room: Option<String>,
}

/// One schedulable section of a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parallel {
    pub id: i64,
    pub course_id: i64,
    pub semester_id: String,
    pub kind: ParallelKind,
    pub number: Option<u32>,
    pub capacity: Option<u32>,
    pub occupied: Option<u32>,
    pub is_full: bool,
    pub can_register: bool,
    pub timetable: Vec<TimetableEvent>,
}

/// A course, with the parallels it offers in one semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// Empty until the course is joined with its parallels
    pub parallels: Vec<Parallel>,
}

impl Course {
    /// Returns a copy of this course carrying `parallels`.
    pub fn with_parallels(&self, parallels: Vec<Parallel>) -> Course {
        Course {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            parallels,
        }
    }
}

/// One page of parsed elements together with the total the server reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
}
