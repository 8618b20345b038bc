//! Fetching and parsing single pages of KOS resources.
//!
//! Every response is expected to look like
//! `{"elements": [...], "page": {"totalElements": N, ...}}`.

use serde_json::Value;
use tracing::{debug, error};

use super::error::{KosError, ParseError};
use super::request::ResourceRequest;
use super::session::KosSession;
use super::types::Page;
use crate::timer::Stopwatch;

/// Reads KOS resources through an authenticated session.
pub struct KosClient {
    session: KosSession,
}

impl KosClient {
    pub fn new(session: KosSession) -> Self {
        Self { session }
    }

    /// Fetches one page and parses every element with `parser`.
    ///
    /// Elements the parser rejects are dropped. A non-success status is a transport
    /// error; a body without `elements` or `page.totalElements` is a schema error.
    pub async fn fetch<T, P>(&self, request: &ResourceRequest, parser: P) -> Result<Page<T>, KosError>
    where
        P: Fn(Value) -> Result<T, ParseError>,
    {
        let watch = Stopwatch::start();
        debug!(request = %request, "Request start");

        let result = self.fetch_body(request).await.and_then(|body| {
            let (elements, total_elements) = split_body(request, body)?;
            Ok(parse_elements(request, elements, total_elements, &parser))
        });

        match &result {
            Ok(page) => debug!(
                request = %request,
                elements = page.items.len(),
                total = page.total_elements,
                elapsed = %watch.elapsed(),
                "Request end"
            ),
            Err(e) => error!(request = %request, error = %e, elapsed = %watch.elapsed(), "Failed to load"),
        }

        result
    }

    async fn fetch_body(&self, request: &ResourceRequest) -> Result<Value, KosError> {
        let response = self
            .session
            .get(request.resource.path())
            .query(&request.query())
            .send()
            .await
            .map_err(|e| KosError::transport(request, e))?;

        let status = response.status();
        debug!(request = %request, status = %status, "Response received");

        let response = response
            .error_for_status()
            .map_err(|e| KosError::transport(request, e))?;

        let text = response
            .text()
            .await
            .map_err(|e| KosError::transport(request, e))?;

        serde_json::from_str(&text)
            .map_err(|e| KosError::schema(request, format!("body is not JSON: {e}")))
    }
}

/// Pulls `elements` and `page.totalElements` out of a response body.
fn split_body(request: &ResourceRequest, mut body: Value) -> Result<(Vec<Value>, u64), KosError> {
    let elements = match body.get_mut("elements").map(Value::take) {
        Some(Value::Array(elements)) => elements,
        Some(_) => return Err(KosError::schema(request, "key 'elements' is not an array")),
        None => return Err(KosError::schema(request, "missing key 'elements'")),
    };

    let total_elements = body
        .get("page")
        .and_then(|page| page.get("totalElements"))
        .and_then(Value::as_u64)
        .ok_or_else(|| KosError::schema(request, "missing key 'page.totalElements'"))?;

    Ok((elements, total_elements))
}

fn parse_elements<T, P>(
    request: &ResourceRequest,
    elements: Vec<Value>,
    total_elements: u64,
    parser: &P,
) -> Page<T>
where
    P: Fn(Value) -> Result<T, ParseError>,
{
    let received = elements.len();
    let items: Vec<T> = elements
        .into_iter()
        .filter_map(|element| match parser(element) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(request = %request, error = %e, "Skipping element");
                None
            }
        })
        .collect();

    if items.len() < received {
        debug!(
            request = %request,
            skipped = received - items.len(),
            "Some elements could not be parsed"
        );
    }

    Page {
        items,
        total_elements,
    }
}
