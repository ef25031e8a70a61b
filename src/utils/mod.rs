pub mod http;
pub mod patterns;
pub mod rate_limiter;

pub use http::{HttpClient, HttpResponse};
pub use patterns::PatternUtils;
pub use rate_limiter::RateLimiter;
