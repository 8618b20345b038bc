//! Picking the current and the next semester.

use chrono::NaiveDate;

use crate::kos::{DomainError, Semester};

/// The two semesters a run downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterPair {
    pub current: Semester,
    pub next: Semester,
}

/// Finds the first semester containing `today` and the semester right after it.
///
/// `semesters` must be sorted by id; "next" means next in that order, not by date.
pub fn select_semesters(semesters: &[Semester], today: NaiveDate) -> Result<SemesterPair, DomainError> {
    let position = semesters
        .iter()
        .position(|s| s.contains(today))
        .ok_or(DomainError::NoCurrentSemester { today })?;

    let current = &semesters[position];
    let next = semesters
        .get(position + 1)
        .ok_or_else(|| DomainError::NoNextSemester {
            current: current.id.clone(),
        })?;

    Ok(SemesterPair {
        current: current.clone(),
        next: next.clone(),
    })
}
