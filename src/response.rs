use crate::backend::CheckOutput;
use actix_web::http::header::{HeaderName, HeaderValue, RETRY_AFTER};
use actix_web::HttpResponse;
use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub static X_RATELIMIT_REMAINING: Lazy<HeaderName> =
    Lazy::new(|| HeaderName::from_static("x-ratelimit-remaining"));

pub static X_RATELIMIT_RESET: Lazy<HeaderName> =
    Lazy::new(|| HeaderName::from_static("x-ratelimit-reset"));

/// Body of a rate limited response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeniedBody {
    pub error: String,
    /// Seconds until the window resets, rounded upwards.
    pub retry_after: u64,
}

/// Builds the response returned to an over-limit client.
///
/// Status 429 with a machine-readable body and `Retry-After`,
/// `X-RateLimit-Remaining` and `X-RateLimit-Reset` (RFC 3339 wall-clock
/// timestamp of the reset) headers, so well-behaved clients can back off
/// automatically.
pub fn too_many_requests(output: &CheckOutput) -> HttpResponse {
    let seconds = output.seconds_until_reset();
    let reset_at = Utc::now() + Duration::from_secs(seconds);
    let mut response = HttpResponse::TooManyRequests().json(DeniedBody {
        error: "Too many requests".to_owned(),
        retry_after: seconds,
    });
    let map = response.headers_mut();
    map.insert(RETRY_AFTER, HeaderValue::from(seconds));
    map.insert(
        X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(output.remaining),
    );
    map.insert(
        X_RATELIMIT_RESET.clone(),
        HeaderValue::from_str(&reset_at.to_rfc3339_opts(SecondsFormat::Secs, true))
            .expect("RFC 3339 timestamp is a valid header value"),
    );
    response
}
