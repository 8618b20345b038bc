//! Parsers turning single KOS API elements into typed entities.
//!
//! Each element is first deserialized into a raw mirror of the API record, in which
//! required fields are plain values and optional ones are `Option`s, then converted.
//! A missing required field is a [`ParseError`]; a missing optional field takes its
//! documented default.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::error::ParseError;
use super::types::{ClockTime, Course, Parallel, ParallelKind, Semester, TimetableEvent, WeekParity};

/// Registration status code of a parallel open for enrollment.
const REGISTRATION_OPEN: &str = "A";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSemester {
    id: String,
    name_cs: String,
    semester_start: Option<String>,
    semester_end: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCourse {
    id: i64,
    code: String,
    name_cs: Option<String>,
    name_en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRef<T> {
    id: T,
}

#[derive(Debug, Deserialize)]
struct RawCode {
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoom {
    room_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimetableSlot {
    day_number: u8,
    even_odd_week: Option<String>,
    weeks_valid: Option<Vec<u32>>,
    ticket_start: String,
    ticket_end: String,
    room: Option<RawRoom>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParallel {
    id: i64,
    course_view: RawRef<i64>,
    semester: RawRef<String>,
    parallel_type: RawCode,
    parallel_number: Option<u32>,
    capacity: Option<u32>,
    occupied_places: Option<u32>,
    registration: Option<String>,
    timetable: Option<Vec<RawTimetableSlot>>,
}

/// Parses a `/semesters` element.
pub fn parse_semester(element: Value) -> Result<Semester, ParseError> {
    let raw: RawSemester = serde_json::from_value(element)?;

    Ok(Semester {
        id: raw.id,
        name: raw.name_cs,
        start: parse_date(raw.semester_start.as_deref())?,
        end: parse_date(raw.semester_end.as_deref())?,
    })
}

/// Parses a `/courses` element. The Czech name wins over the English one.
pub fn parse_course(element: Value) -> Result<Course, ParseError> {
    let raw: RawCourse = serde_json::from_value(element)?;

    let name = raw
        .name_cs
        .or(raw.name_en)
        .ok_or_else(|| ParseError::Malformed(format!("course {} has no name", raw.id)))?;

    Ok(Course {
        id: raw.id,
        code: raw.code,
        name,
        parallels: Vec::new(),
    })
}

/// Parses a `/timetables/parallel-classes` element.
pub fn parse_parallel(element: Value) -> Result<Parallel, ParseError> {
    let raw: RawParallel = serde_json::from_value(element)?;

    let kind = ParallelKind::from_code(&raw.parallel_type.code)
        .ok_or_else(|| ParseError::UnknownParallelType(raw.parallel_type.code.clone()))?;

    // Missing capacity never counts as full, missing status counts as open
    let capacity = raw.capacity.unwrap_or(0);
    let occupied = raw.occupied_places.unwrap_or(0);
    let is_full = capacity > 0 && occupied >= capacity;
    let can_register = raw.registration.as_deref().unwrap_or(REGISTRATION_OPEN) == REGISTRATION_OPEN;

    let timetable = raw
        .timetable
        .unwrap_or_default()
        .into_iter()
        .map(parse_timetable_slot)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Parallel {
        id: raw.id,
        course_id: raw.course_view.id,
        semester_id: raw.semester.id,
        kind,
        number: raw.parallel_number,
        capacity: raw.capacity,
        occupied: raw.occupied_places,
        is_full,
        can_register,
        timetable,
    })
}

fn parse_timetable_slot(raw: RawTimetableSlot) -> Result<TimetableEvent, ParseError> {
    Ok(TimetableEvent {
        day_of_week: raw.day_number,
        week: raw.even_odd_week.as_deref().and_then(WeekParity::from_api),
        weeks_valid: raw.weeks_valid.unwrap_or_default(),
        start: parse_clock_time(&raw.ticket_start)?,
        end: parse_clock_time(&raw.ticket_end)?,
        room: raw.room.and_then(|room| room.room_number),
    })
}

/// Splits `"HH:MM"` into `(hour, minute)`.
pub fn parse_clock_time(value: &str) -> Result<ClockTime, ParseError> {
    let invalid = || ParseError::InvalidTime(value.to_string());

    let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
    let hour: u8 = hour.trim().parse().map_err(|_| invalid())?;
    let minute: u8 = minute.trim().parse().map_err(|_| invalid())?;

    if hour > 23 || minute > 59 {
        return Err(invalid());
    }

    Ok((hour, minute))
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate, ParseError> {
    match value {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| ParseError::InvalidDate(text.to_string())),
        None => Ok(NaiveDate::MIN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_semester() {
        let semester = parse_semester(json!({
            "id": "B231",
            "nameCs": "Zimní 2023/2024",
            "semesterStart": "2023-09-18",
            "semesterEnd": "2024-02-18",
        }))
        .unwrap();

        assert_eq!(semester.id, "B231");
        assert_eq!(semester.name, "Zimní 2023/2024");
        assert_eq!(semester.start, NaiveDate::from_ymd_opt(2023, 9, 18).unwrap());
        assert_eq!(semester.end, NaiveDate::from_ymd_opt(2024, 2, 18).unwrap());
    }

    #[test]
    fn test_parse_semester_without_boundaries() {
        let semester = parse_semester(json!({"id": "B000", "nameCs": "Old"})).unwrap();
        assert_eq!(semester.start, NaiveDate::MIN);
        assert_eq!(semester.end, NaiveDate::MIN);
    }

    #[test]
    fn test_parse_semester_missing_name_is_skipped() {
        assert!(parse_semester(json!({"id": "B231"})).is_err());
    }

    #[test]
    fn test_parse_course_prefers_czech_name() {
        let course = parse_course(json!({
            "id": 10,
            "code": "BI-PA1",
            "nameCs": "Programování a algoritmizace 1",
            "nameEn": "Programming and Algorithmics 1",
        }))
        .unwrap();
        assert_eq!(course.name, "Programování a algoritmizace 1");
        assert!(course.parallels.is_empty());

        let course = parse_course(json!({"id": 11, "code": "BI-X", "nameEn": "English"})).unwrap();
        assert_eq!(course.name, "English");
    }

    #[test]
    fn test_parse_parallel_defaults() {
        let parallel = parse_parallel(json!({
            "id": 1,
            "courseView": {"id": 10},
            "semester": {"id": "S1"},
            "parallelType": {"code": "P"},
            "timetable": [],
        }))
        .unwrap();

        assert_eq!(parallel.course_id, 10);
        assert_eq!(parallel.semester_id, "S1");
        assert_eq!(parallel.kind, ParallelKind::Lecture);
        assert_eq!(parallel.number, None);
        assert_eq!(parallel.capacity, None);
        assert_eq!(parallel.occupied, None);
        assert!(!parallel.is_full);
        assert!(parallel.can_register);
        assert!(parallel.timetable.is_empty());
    }

    #[test]
    fn test_parse_parallel_full_and_closed() {
        let parallel = parse_parallel(json!({
            "id": 2,
            "courseView": {"id": 10},
            "semester": {"id": "S1"},
            "parallelType": {"code": "C"},
            "parallelNumber": 101,
            "capacity": 24,
            "occupiedPlaces": 24,
            "registration": "N",
            "timetable": [{
                "dayNumber": 3,
                "evenOddWeek": "ODD",
                "weeksValid": [1, 3, 5],
                "ticketStart": "09:15",
                "ticketEnd": "10:45",
                "room": {"roomNumber": "TH:A-1442"},
            }, {
                "dayNumber": 5,
                "ticketStart": "14:30",
                "ticketEnd": "16:00",
            }],
        }))
        .unwrap();

        assert_eq!(parallel.kind, ParallelKind::Tutorial);
        assert_eq!(parallel.number, Some(101));
        assert!(parallel.is_full);
        assert!(!parallel.can_register);
        assert_eq!(parallel.timetable.len(), 2);

        let first = &parallel.timetable[0];
        assert_eq!(first.day_of_week, 3);
        assert_eq!(first.week, Some(WeekParity::Odd));
        assert_eq!(first.weeks_valid, vec![1, 3, 5]);
        assert_eq!(first.start, (9, 15));
        assert_eq!(first.end, (10, 45));
        assert_eq!(first.room.as_deref(), Some("TH:A-1442"));

        let second = &parallel.timetable[1];
        assert_eq!(second.week, None);
        assert!(second.weeks_valid.is_empty());
        assert_eq!(second.room, None);
    }

    #[test]
    fn test_zero_capacity_is_never_full() {
        let parallel = parse_parallel(json!({
            "id": 3,
            "courseView": {"id": 10},
            "semester": {"id": "S1"},
            "parallelType": {"code": "L"},
            "capacity": 0,
            "occupiedPlaces": 5,
        }))
        .unwrap();
        assert!(!parallel.is_full);
    }

    #[test]
    fn test_parse_parallel_rejects_unknown_type() {
        let err = parse_parallel(json!({
            "id": 4,
            "courseView": {"id": 10},
            "semester": {"id": "S1"},
            "parallelType": {"code": "X"},
        }))
        .unwrap_err();
        assert_eq!(err, ParseError::UnknownParallelType("X".to_string()));
    }

    #[test]
    fn test_parse_parallel_requires_course() {
        assert!(parse_parallel(json!({
            "id": 5,
            "semester": {"id": "S1"},
            "parallelType": {"code": "P"},
        }))
        .is_err());
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(parse_clock_time("07:30"), Ok((7, 30)));
        assert_eq!(parse_clock_time("9:05"), Ok((9, 5)));
        assert!(parse_clock_time("0930").is_err());
        assert!(parse_clock_time("25:00").is_err());
        assert!(parse_clock_time("aa:bb").is_err());
    }
}
