pub mod builder;
#[cfg(test)]
mod tests;

use crate::backend::{Backend, CheckInput, CheckOutput};
use crate::policy::Policy;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::HttpResponse;
use builder::RateLimiterBuilder;
use futures::future::{ok, LocalBoxFuture, Ready};
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type KeyFn = dyn Fn(&ServiceRequest) -> String;
pub(crate) type DeniedResponse = dyn Fn(&CheckOutput) -> HttpResponse;

/// Rate limit middleware enforcing one [Policy] on every request in the
/// wrapped scope.
///
/// Routes that need finer control call
/// [check_rate_limit](crate::check_rate_limit) directly instead.
pub struct RateLimiter<B> {
    backend: B,
    policy: Policy,
    key_fn: Rc<KeyFn>,
    fail_open: bool,
    denied_response: Rc<DeniedResponse>,
}

impl<B: Backend> Clone for RateLimiter<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            policy: self.policy,
            key_fn: self.key_fn.clone(),
            fail_open: self.fail_open,
            denied_response: self.denied_response.clone(),
        }
    }
}

impl<B: Backend + 'static> RateLimiter<B> {
    /// # Arguments
    ///
    /// * `backend`: A rate limiting algorithm and store implementation.
    /// * `policy`: The admission policy to enforce.
    pub fn builder(backend: B, policy: Policy) -> RateLimiterBuilder<B> {
        RateLimiterBuilder::new(backend, policy)
    }
}

impl<S, B, BA> Transform<S, ServiceRequest> for RateLimiter<BA>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
    BA: Backend + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = RateLimiterMiddleware<S, BA>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimiterMiddleware {
            service: Rc::new(RefCell::new(service)),
            backend: self.backend.clone(),
            policy: self.policy,
            key_fn: Rc::clone(&self.key_fn),
            fail_open: self.fail_open,
            denied_response: self.denied_response.clone(),
        })
    }
}

pub struct RateLimiterMiddleware<S, B> {
    service: Rc<RefCell<S>>,
    backend: B,
    policy: Policy,
    key_fn: Rc<KeyFn>,
    fail_open: bool,
    denied_response: Rc<DeniedResponse>,
}

impl<S, B, BA> Service<ServiceRequest> for RateLimiterMiddleware<S, BA>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
    BA: Backend + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let backend = self.backend.clone();
        let policy = self.policy;
        let key_fn = self.key_fn.clone();
        let fail_open = self.fail_open;
        let denied_response = self.denied_response.clone();

        Box::pin(async move {
            let input = CheckInput {
                policy,
                key: (key_fn)(&req),
            };
            match backend.check(input).await {
                // Able to successfully query the rate limiter backend
                Ok((decision, output)) => {
                    if decision.is_denied() {
                        let response = (denied_response)(&output);
                        return Ok(req.into_response(response).map_into_right_body());
                    }
                }
                // Unable to query the rate limiter backend
                Err(e) => {
                    if fail_open {
                        log::warn!("Rate limiter failed: {e}, allowing the request anyway");
                    } else {
                        log::error!("Rate limiter failed: {e}");
                        return Ok(req.into_response(e.error_response()).map_into_right_body());
                    }
                }
            }

            let service_response = service.call(req).await?;
            Ok(service_response.map_into_left_body())
        })
    }
}
