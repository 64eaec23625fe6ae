//! Error types for the market data crate.
//!
//! Every fallible operation in this crate returns [`MarketDataError`]. The
//! variants keep the provider that produced them so the registry can log a
//! useful trail while walking the fallback chain.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The upstream kept answering HTTP 429 until the retry budget ran out.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider (or URL host) that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The upstream answered with an error status other than 429.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status returned by the upstream
        status: StatusCode,
        /// The request URL
        url: String,
    },

    /// The upstream answered 2xx but the body was not the expected JSON.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that returned the body
        provider: String,
        /// What went wrong while decoding
        message: String,
    },

    /// A provider-specific error occurred.
    /// The registry moves on to the next provider.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{operation} is not supported by {provider}")]
    NotSupported {
        /// Operation name (e.g. "historical")
        operation: String,
        /// The provider that was asked
        provider: String,
    },

    /// The identifier could not be mapped to anything the provider knows.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No providers are registered for the request.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// All providers were tried and all failed.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("unknown-coin".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: unknown-coin");

        let error = MarketDataError::RateLimited {
            provider: "COINGECKO".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: COINGECKO");

        let error = MarketDataError::HttpStatus {
            status: StatusCode::NOT_FOUND,
            url: "https://api.example.test/coins/x".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "HTTP 404 Not Found from https://api.example.test/coins/x"
        );

        let error = MarketDataError::ProviderError {
            provider: "BINANCE".to_string(),
            message: "no symbols priced".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: BINANCE - no symbols priced"
        );
    }
}
