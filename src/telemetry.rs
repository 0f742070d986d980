//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `larder_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `source`: where a result came from (e.g. "spoonacular", "openai")
//! - `operation`: request type (e.g. "find_recipes", "meal_plan")
//! - `status`: outcome: "ok" or "error"

/// Total upstream requests issued by the orchestrator.
///
/// Labels: `source`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "larder_requests_total";

/// Upstream request duration in seconds.
///
/// Labels: `source`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "larder_request_duration_seconds";

/// Total cache hits.
///
/// Labels: `operation`.
pub const CACHE_HITS_TOTAL: &str = "larder_cache_hits_total";

/// Total cache misses.
///
/// Labels: `operation`.
pub const CACHE_MISSES_TOTAL: &str = "larder_cache_misses_total";

/// Total times the orchestrator fell back from the recipe API to the AI generator.
///
/// Labels: `operation`, `reason` ("error" | "empty" | "rejected" | "unregistered").
pub const FALLBACKS_TOTAL: &str = "larder_fallbacks_total";
