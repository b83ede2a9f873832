//! HTTP transport for the catalog source
//!
//! One call path: a rate-limited, retrying GET that decodes JSON. The
//! pagination engine never uses this directly.

mod client;
mod throttle;

pub use client::{Backoff, HttpClient, HttpClientConfig};
pub use throttle::{RateLimit, Throttle};
