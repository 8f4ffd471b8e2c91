use crate::backend::{Backend, CheckOutput};
use crate::key::client_key;
use crate::middleware::{DeniedResponse, KeyFn, RateLimiter};
use crate::policy::Policy;
use crate::response;
use actix_web::dev::ServiceRequest;
use actix_web::HttpResponse;
use std::rc::Rc;

pub struct RateLimiterBuilder<B> {
    backend: B,
    policy: Policy,
    key_fn: Rc<KeyFn>,
    fail_open: bool,
    denied_response: Rc<DeniedResponse>,
}

impl<B: Backend + 'static> RateLimiterBuilder<B> {
    pub(super) fn new(backend: B, policy: Policy) -> Self {
        Self {
            backend,
            policy,
            key_fn: Rc::new(|req: &ServiceRequest| client_key(req.headers())),
            fail_open: false,
            denied_response: Rc::new(response::too_many_requests),
        }
    }

    /// Override how the rate limit key is derived from a request.
    ///
    /// Defaults to [client_key], the proxy-header derivation used across the
    /// dashboard's API routes.
    pub fn key_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ServiceRequest) -> String + 'static,
    {
        self.key_fn = Rc::new(f);
        self
    }

    /// Choose whether to allow a request if the backend returns a failure.
    ///
    /// Default is false.
    pub fn fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    /// In the event that the request is denied, configure the [HttpResponse]
    /// returned.
    ///
    /// Defaults to [too_many_requests](crate::too_many_requests): status 429
    /// with a JSON body and retry metadata headers.
    pub fn denied_response<R>(mut self, denied_response: R) -> Self
    where
        R: Fn(&CheckOutput) -> HttpResponse + 'static,
    {
        self.denied_response = Rc::new(denied_response);
        self
    }

    pub fn build(self) -> RateLimiter<B> {
        RateLimiter {
            backend: self.backend,
            policy: self.policy,
            key_fn: self.key_fn,
            fail_open: self.fail_open,
            denied_response: self.denied_response,
        }
    }
}
