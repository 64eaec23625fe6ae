//! Outbound HTTP for upstream price APIs.
//!
//! - [`HttpTransport`] sends a [`FetchRequest`] and returns the raw answer
//! - [`CachedFetcher`] layers the response cache and the 429 backoff on top

mod fetcher;
mod transport;

pub use fetcher::CachedFetcher;
pub use transport::{FetchRequest, HttpTransport, ReqwestTransport, TransportResponse};

#[cfg(test)]
pub(crate) use fetcher::tests::ScriptedTransport;
