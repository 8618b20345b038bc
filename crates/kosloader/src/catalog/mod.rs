//! Turning downloaded KOS data into per-semester course lists.

mod join;
mod output;
mod select;

pub use join::{group_by_course, join_courses};
pub use output::{write_output, CourseView, EventView, OutputDocument, ParallelView};
pub use select::{select_semesters, SemesterPair};
