//! Generic cursor (offset/limit) pagination loop.
//!
//! Drives an envelope-producing call repeatedly, placing the offset/limit
//! pair per the configured strategy, until a termination condition, and
//! accumulates the extracted records into the final envelope's payload.
//! Intermediate envelopes are never mutated; a failing envelope aborts the
//! loop and is returned unmodified, so no partial accumulation is exposed.

use std::collections::BTreeMap;
use std::future::Future;

use helio_domain::{CallContext, HelioError, PageStage, Payload, ResponseEnvelope, Result};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Where the offset/limit pair goes on each page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetStrategy {
    /// Placed into the query string.
    QueryParams,
    /// Merged into the outgoing JSON body.
    RequestBody,
}

/// Caller-supplied transform applied to the page body before each call.
pub type BodyTransform = Box<dyn Fn(Value) -> std::result::Result<Value, String> + Send + Sync>;

/// Pagination parameters for one loop.
#[derive(Debug, Clone)]
pub struct PaginateConfig {
    /// Key name for the offset (e.g. `"offset"` or `"skip"`).
    pub offset_key: String,
    /// Key name for the page size (e.g. `"limit"`).
    pub limit_key: String,
    /// Offset placement strategy.
    pub strategy: OffsetStrategy,
    /// Nominal page size.
    pub limit: usize,
    /// Starting offset.
    pub skip: usize,
    /// Hard cap on accumulated records. Ignored while `loop_until_end`.
    pub maximum: Option<usize>,
    /// Keep going until an empty page even past `maximum`.
    pub loop_until_end: bool,
}

impl PaginateConfig {
    /// Query-string pagination from offset 0 with the given page size.
    pub fn offset_limit(limit: usize) -> Self {
        Self {
            offset_key: "offset".to_string(),
            limit_key: "limit".to_string(),
            strategy: OffsetStrategy::QueryParams,
            limit,
            skip: 0,
            maximum: None,
            loop_until_end: false,
        }
    }

    /// Cap accumulation at `maximum` records.
    #[must_use]
    pub fn maximum(mut self, maximum: usize) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Loop until the server runs out of pages, ignoring `maximum`.
    #[must_use]
    pub fn loop_until_end(mut self, enabled: bool) -> Self {
        self.loop_until_end = enabled;
        self
    }

    /// Place the offset/limit pair in the JSON body instead of the query.
    #[must_use]
    pub fn in_body(mut self) -> Self {
        self.strategy = OffsetStrategy::RequestBody;
        self
    }

    /// Start from a non-zero offset.
    #[must_use]
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

/// One page request handed to the caller's route closure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    /// Query parameters for this page (offset/limit included when the
    /// strategy is [`OffsetStrategy::QueryParams`]).
    pub params: BTreeMap<String, String>,
    /// JSON body for this page (offset/limit merged in when the strategy is
    /// [`OffsetStrategy::RequestBody`]).
    pub body: Option<Value>,
}

/// Drive `call` page by page, accumulating records extracted by `extract`.
///
/// `extract` pulls the page's record array out of an envelope; its failures
/// are reported as record-extraction pagination errors, while failures of
/// `body_transform` are reported as body-transform errors, so construction
/// bugs and parsing bugs stay distinguishable.
///
/// On success the returned envelope is the last one received, its payload
/// replaced by the accumulated record array.
#[instrument(skip_all, fields(caller = %ctx.caller_label, limit = config.limit, skip = config.skip))]
pub async fn paginate<C, Fut, X>(
    ctx: CallContext,
    config: PaginateConfig,
    base_body: Option<Value>,
    mut call: C,
    extract: X,
    body_transform: Option<BodyTransform>,
) -> Result<ResponseEnvelope>
where
    C: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<ResponseEnvelope>>,
    X: Fn(&ResponseEnvelope) -> std::result::Result<Vec<Value>, String>,
{
    let mut accumulated: Vec<Value> = Vec::new();
    let mut skip = config.skip;
    let mut limit = config.limit;

    // First-page clamp: never ask for more than the caller will keep.
    if let Some(maximum) = config.maximum {
        if !config.loop_until_end && maximum <= limit {
            limit = maximum;
        }
    }

    let final_envelope = loop {
        let request = build_page_request(&config, base_body.clone(), skip, limit);
        let request = match &body_transform {
            Some(transform) => apply_body_transform(transform, request, &ctx)?,
            None => request,
        };

        debug!(skip, limit, accumulated = accumulated.len(), "requesting page");
        let envelope = call(request).await?;

        // A failing envelope aborts the loop as-is; the caller inspects it.
        if !envelope.success {
            debug!(status = envelope.status, "page call failed; aborting loop");
            return Ok(envelope);
        }

        let records = extract(&envelope).map_err(|detail| HelioError::Pagination {
            stage: PageStage::RecordExtraction,
            caller_label: ctx.caller_label.clone(),
            detail,
        })?;
        let count = records.len();
        accumulated.extend(records);

        let reached_maximum = match config.maximum {
            Some(maximum) => !config.loop_until_end && accumulated.len() >= maximum,
            None => false,
        };
        if count == 0 || reached_maximum {
            break envelope;
        }

        // Shrink the next page so it cannot overshoot the cap.
        if let Some(maximum) = config.maximum {
            if !config.loop_until_end {
                limit = limit.min(maximum - accumulated.len());
            }
        }
        // Advance by what actually arrived, tolerating short pages.
        skip += count;
    };

    debug!(total = accumulated.len(), "pagination complete");
    Ok(final_envelope.with_payload(Payload::Json(Value::Array(accumulated))))
}

fn build_page_request(
    config: &PaginateConfig,
    base_body: Option<Value>,
    skip: usize,
    limit: usize,
) -> PageRequest {
    match config.strategy {
        OffsetStrategy::QueryParams => {
            let mut params = BTreeMap::new();
            params.insert(config.offset_key.clone(), skip.to_string());
            params.insert(config.limit_key.clone(), limit.to_string());
            PageRequest { params, body: base_body }
        }
        OffsetStrategy::RequestBody => {
            let mut object = match base_body {
                Some(Value::Object(map)) => map,
                // A non-object base body is replaced; the cursor pair must
                // live at the top level.
                _ => Map::new(),
            };
            object.insert(config.offset_key.clone(), Value::from(skip as u64));
            object.insert(config.limit_key.clone(), Value::from(limit as u64));
            PageRequest { params: BTreeMap::new(), body: Some(Value::Object(object)) }
        }
    }
}

fn apply_body_transform(
    transform: &BodyTransform,
    request: PageRequest,
    ctx: &CallContext,
) -> Result<PageRequest> {
    let body = request.body.unwrap_or(Value::Null);
    let body = transform(body).map_err(|detail| HelioError::Pagination {
        stage: PageStage::BodyTransform,
        caller_label: ctx.caller_label.clone(),
        detail,
    })?;
    Ok(PageRequest { params: request.params, body: Some(body) })
}
