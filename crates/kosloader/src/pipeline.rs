//! A complete loader run: login, download, join, write.

use std::path::Path;

use chrono::{Local, NaiveDate};
use futures::future::try_join;
use tracing::info;

use crate::catalog::{join_courses, select_semesters, write_output, OutputDocument};
use crate::config::{ApiConfig, Config};
use crate::kos::{
    fetch_semesters, parse_course, parse_parallel, Delay, KosClient, KosError, KosSession, Paginator,
    ResourceRequest,
};
use crate::timer::timed;

/// What a run downloaded and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub current_semester: String,
    pub next_semester: String,
    pub current_courses: usize,
    pub next_courses: usize,
}

/// Logs in with the configured credentials and runs the loader for today's date.
pub async fn run(config: &Config) -> Result<RunSummary, KosError> {
    let session = KosSession::login(&config.api, &config.credentials).await?;
    let client = KosClient::new(session);

    run_with_client(&client, &config.api, &config.output_path, Local::now().date_naive()).await
}

/// Runs the loader with an already prepared client.
pub async fn run_with_client(
    client: &KosClient,
    api: &ApiConfig,
    output_path: &Path,
    today: NaiveDate,
) -> Result<RunSummary, KosError> {
    info!("Downloading semesters");
    let (semesters, elapsed) = timed(fetch_semesters(client)).await;
    let semesters = semesters?;
    info!(elapsed = %elapsed, "Downloaded semesters");

    let pair = select_semesters(&semesters, today)?;
    let current_id = pair.current.id.as_str();
    let next_id = pair.next.id.as_str();
    info!(current = current_id, next = next_id, "Found semesters");

    let paginator = Paginator::new(client, api);
    let jitter = Delay::Jitter(api.max_jitter);

    info!("Getting total counts of parallels");
    let current_count = ResourceRequest::parallels(current_id).with_size(1);
    let next_count = ResourceRequest::parallels(next_id).with_size(1);
    let (probes, elapsed) = timed(try_join(
        paginator.fetch_one(&current_count, parse_parallel, jitter),
        paginator.fetch_one(&next_count, parse_parallel, jitter),
    ))
    .await;
    let (current_probe, next_probe) = probes?;
    info!(
        current = current_probe.total_elements,
        next = next_probe.total_elements,
        elapsed = %elapsed,
        "Found parallel counts"
    );

    // Pages of the next semester continue the stagger where the current semester ends
    let current_pages = paginator.schedule(
        &ResourceRequest::parallels(current_id),
        current_probe.total_elements,
        0,
    );
    let next_pages = paginator.schedule(
        &ResourceRequest::parallels(next_id),
        next_probe.total_elements,
        current_pages.len() as u64,
    );

    info!(
        current_pages = current_pages.len(),
        next_pages = next_pages.len(),
        page_size = paginator.page_size(),
        "Downloading courses and parallels"
    );
    let courses_request = ResourceRequest::courses();
    let (downloaded, elapsed) = timed(async {
        tokio::try_join!(
            paginator.fetch_one(&courses_request, parse_course, Delay::None),
            paginator.fetch_all(&current_pages, parse_parallel),
            paginator.fetch_all(&next_pages, parse_parallel),
        )
    })
    .await;
    let (courses, current_parallels, next_parallels) = downloaded?;
    let courses = courses.items;
    info!(
        courses = courses.len(),
        current_parallels = current_parallels.len(),
        next_parallels = next_parallels.len(),
        elapsed = %elapsed,
        "Downloaded data"
    );

    info!("Matching parallels and courses");
    let current_courses = join_courses(&courses, &current_parallels);
    let next_courses = join_courses(&courses, &next_parallels);

    info!(path = %output_path.display(), "Writing the result");
    let mut document = OutputDocument::new();
    document.insert(current_id, &current_courses);
    document.insert(next_id, &next_courses);
    write_output(output_path, &document).await?;

    info!("Done");
    Ok(RunSummary {
        current_semester: current_id.to_string(),
        next_semester: next_id.to_string(),
        current_courses: current_courses.len(),
        next_courses: next_courses.len(),
    })
}
