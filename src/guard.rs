use crate::backend::{Backend, CheckInput};
use crate::key::client_key;
use crate::policy::Policy;
use crate::response;
use actix_web::{HttpRequest, HttpResponse};

/// Checks a request against a policy before any real work is done.
///
/// Returns `Some` with a ready-made 429 response when the caller is over its
/// limit, and `None` when the request may proceed. A handler's only obligation
/// is to return a `Some` verbatim:
///
/// ```ignore
/// if let Some(denied) = check_rate_limit(&backend, &req, policy::SEARCH).await? {
///     return Ok(denied);
/// }
/// ```
pub async fn check_rate_limit<B: Backend>(
    backend: &B,
    req: &HttpRequest,
    policy: Policy,
) -> actix_web::Result<Option<HttpResponse>> {
    let key = client_key(req.headers());
    let (decision, output) = backend.check(CheckInput { policy, key }).await?;
    if decision.is_denied() {
        return Ok(Some(response::too_many_requests(&output)));
    }
    Ok(None)
}
