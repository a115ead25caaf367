//! Quote Source Port (Driven Port)
//!
//! Interface to the external market-data provider. Implementations perform
//! one uncached lookup per call; caching lives in `MarketDataProvider`.

use async_trait::async_trait;

use crate::domain::quote::QuoteRecord;
use crate::domain::shared::Symbol;

/// Quote source error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QuoteSourceError {
    /// Transport failure (connect, timeout, TLS).
    #[error("Quote request failed: {message}")]
    Request {
        /// Error details.
        message: String,
    },

    /// Non-success HTTP status.
    #[error("Quote provider returned HTTP {status}")]
    Status {
        /// Status code.
        status: u16,
    },

    /// Provider has no data for the symbol.
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// Response body did not match the expected shape.
    #[error("Quote response invalid: {message}")]
    Decode {
        /// Error details.
        message: String,
    },

    /// Lookup exceeded its deadline.
    #[error("Quote lookup timed out")]
    Timeout,
}

/// Port for market-data lookups.
#[async_trait]
pub trait QuoteSourcePort: Send + Sync {
    /// Look up market data for one symbol.
    async fn lookup(&self, symbol: &Symbol) -> Result<QuoteRecord, QuoteSourceError>;
}
