/// Client for the KOS REST API
mod client;
mod error;
mod pagination;
mod parse;
mod request;
mod session;
mod types;

pub use client::KosClient;
pub use error::{AuthError, ConfigError, DomainError, KosError, ParseError};
pub use pagination::{page_count, Delay, Paginator, ScheduledPage};
pub use parse::{parse_clock_time, parse_course, parse_parallel, parse_semester};
pub use request::{Resource, ResourceRequest};
pub use session::KosSession;
pub use types::*;

use tracing::info;

/// Downloads every semester, sorted by id.
pub async fn fetch_semesters(client: &KosClient) -> Result<Vec<Semester>, KosError> {
    let page = client
        .fetch(&ResourceRequest::semesters(), parse_semester)
        .await?;

    let mut semesters = page.items;
    semesters.sort_by(|a, b| a.id.cmp(&b.id));

    info!("Downloaded {} semesters", semesters.len());
    Ok(semesters)
}
