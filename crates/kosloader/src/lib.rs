//! Downloads the semesters, courses and timetable parallels of the CTU information
//! system (KOS) and stores the courses of the current and the next semester as JSON.

pub mod catalog;
pub mod config;
pub mod kos;
pub mod logging;
pub mod pipeline;
pub mod timer;
