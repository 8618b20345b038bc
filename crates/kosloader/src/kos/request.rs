//! Requests against the three KOS resources the loader reads.

use std::fmt;

/// Parallels are fetched with their teachers and rooms expanded.
const PARALLELS_EXPANDED: &str = "teachers,timetable.teachers,timetable.room";

/// A KOS resource collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Semesters,
    Courses,
    Parallels { semester_id: String },
}

impl Resource {
    /// Path relative to the API root.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Semesters => "/semesters",
            Resource::Courses => "/courses",
            Resource::Parallels { .. } => "/timetables/parallel-classes",
        }
    }
}

/// A GET request for one page of one resource.
///
/// A `size` of `0` asks the server for every element at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub resource: Resource,
    pub size: u32,
    pub page: Option<u64>,
}

impl ResourceRequest {
    pub fn semesters() -> Self {
        Self::new(Resource::Semesters)
    }

    pub fn courses() -> Self {
        Self::new(Resource::Courses)
    }

    pub fn parallels(semester_id: impl Into<String>) -> Self {
        Self::new(Resource::Parallels {
            semester_id: semester_id.into(),
        })
    }

    fn new(resource: Resource) -> Self {
        Self {
            resource,
            size: 0,
            page: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    /// Query parameters in the order they are sent.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("size", self.size.to_string())];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params.push(("sort", "id".to_string()));

        if let Resource::Parallels { semester_id } = &self.resource {
            params.push(("query", format!("semesterId=={semester_id}")));
            params.push(("expanded", PARALLELS_EXPANDED.to_string()));
        }

        params
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.resource.path())?;
        for (i, (key, value)) in self.query().iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}
