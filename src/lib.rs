pub mod backend;
mod guard;
mod key;
mod middleware;
mod policy;
mod response;

pub use guard::check_rate_limit;
pub use key::{client_key, FALLBACK_KEY};
pub use middleware::builder::RateLimiterBuilder;
pub use middleware::RateLimiter;
pub use policy::{Policy, API_DEFAULT, INDEX, SEARCH, SEND_MESSAGE, SPAWN};
pub use response::{too_many_requests, DeniedBody};
