//! Provider registry module.
//!
//! Orchestrates the ordered provider list: priority ordering, fallback for
//! current prices and provider selection for history.

mod registry;

pub use registry::ProviderRegistry;
