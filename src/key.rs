use actix_web::http::header::HeaderMap;

/// Key used when no proxy headers identify the caller.
///
/// With neither header present every caller collapses onto this single key,
/// so the limiter degrades to one global window per policy.
pub const FALLBACK_KEY: &str = "default";

/// Derives a stable rate limit key for the caller from proxy headers.
///
/// Precedence: the first comma-separated entry of `X-Forwarded-For`, then
/// `X-Real-IP`, then [FALLBACK_KEY]. Values are trimmed; blank values fall
/// through to the next source. Never fails.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_owned();
        }
    }
    FALLBACK_KEY.to_owned()
}
