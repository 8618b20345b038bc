/// Attaching parallels to the courses they belong to
use std::collections::HashMap;

use crate::kos::{Course, Parallel};

/// Groups `parallels` by course id, keeping the arrival order inside each group.
pub fn group_by_course(parallels: &[Parallel]) -> HashMap<i64, Vec<Parallel>> {
    let mut groups: HashMap<i64, Vec<Parallel>> = HashMap::new();
    for parallel in parallels {
        groups
            .entry(parallel.course_id)
            .or_default()
            .push(parallel.clone());
    }
    groups
}

/// Builds the course list of one semester.
///
/// Every course with at least one parallel is returned once, as a new value carrying
/// its parallels, in the order of `courses`. Courses without parallels are left out.
/// Neither input is modified.
pub fn join_courses(courses: &[Course], parallels: &[Parallel]) -> Vec<Course> {
    let mut groups = group_by_course(parallels);

    courses
        .iter()
        .filter_map(|course| {
            groups
                .remove(&course.id)
                .map(|group| course.with_parallels(group))
        })
        .collect()
}
