//! Financial Modeling Prep Quote Source
//!
//! One symbol lookup fans out to three endpoints concurrently:
//!
//! | Endpoint                        | Fields                        | Required |
//! |---------------------------------|-------------------------------|----------|
//! | `/api/v3/quote/{symbol}`        | price, previousClose, exchange | yes     |
//! | `/api/v3/profile/{symbol}`      | country (exchange fallback)   | no       |
//! | `/api/v4/shares_float?symbol=`  | floatShares                   | no       |
//!
//! Failures of the optional endpoints only leave their fields unknown.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::ports::{QuoteSourceError, QuoteSourcePort};
use crate::domain::quote::QuoteRecord;
use crate::domain::shared::Symbol;
use crate::infrastructure::config::ApiKey;

/// FMP implementation of [`QuoteSourcePort`].
#[derive(Debug, Clone)]
pub struct FmpQuoteSource {
    client: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

impl FmpQuoteSource {
    /// Create a quote source.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, QuoteSourceError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .query(&[("apikey", self.api_key.expose())])
            .send()
            .await
            .map_err(|e| map_request_error(e.without_url()))?;

        if !response.status().is_success() {
            return Err(QuoteSourceError::Status {
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(|e| QuoteSourceError::Decode {
            message: e.without_url().to_string(),
        })
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<FmpQuote, QuoteSourceError> {
        let rows: Vec<FmpQuote> = self
            .get(&format!("/api/v3/quote/{}", symbol.as_str()), &[])
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| QuoteSourceError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    async fn fetch_profile(&self, symbol: &Symbol) -> Result<Option<FmpProfile>, QuoteSourceError> {
        let rows: Vec<FmpProfile> = self
            .get(&format!("/api/v3/profile/{}", symbol.as_str()), &[])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_float(&self, symbol: &Symbol) -> Result<Option<FmpFloat>, QuoteSourceError> {
        let rows: Vec<FmpFloat> = self
            .get("/api/v4/shares_float", &[("symbol", symbol.as_str())])
            .await?;
        Ok(rows.into_iter().next())
    }
}

fn map_request_error(e: reqwest::Error) -> QuoteSourceError {
    if e.is_timeout() {
        QuoteSourceError::Timeout
    } else {
        QuoteSourceError::Request {
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSourcePort for FmpQuoteSource {
    async fn lookup(&self, symbol: &Symbol) -> Result<QuoteRecord, QuoteSourceError> {
        let (quote, profile, float) = tokio::join!(
            self.fetch_quote(symbol),
            self.fetch_profile(symbol),
            self.fetch_float(symbol),
        );

        let quote = quote?;
        let profile = profile.unwrap_or_else(|e| {
            tracing::debug!(symbol = %symbol, error = %e, "Profile lookup failed");
            None
        });
        let float = float.unwrap_or_else(|e| {
            tracing::debug!(symbol = %symbol, error = %e, "Float lookup failed");
            None
        });

        Ok(build_record(symbol, quote, profile, float))
    }
}

fn build_record(
    symbol: &Symbol,
    quote: FmpQuote,
    profile: Option<FmpProfile>,
    float: Option<FmpFloat>,
) -> QuoteRecord {
    let profile_exchange = profile
        .as_ref()
        .and_then(|p| non_blank(p.exchange_short_name.clone()));

    QuoteRecord {
        symbol: symbol.clone(),
        price: quote.price.and_then(to_decimal),
        previous_close: quote.previous_close.and_then(to_decimal),
        float_shares: float.and_then(|f| f.float_shares).and_then(to_share_count),
        exchange: non_blank(quote.exchange).or(profile_exchange),
        country: profile.and_then(|p| non_blank(p.country)),
        fetched_at: Utc::now(),
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok().map(|d| d.round_dp(4))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_share_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u64)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpQuote {
    price: Option<f64>,
    previous_close: Option<f64>,
    exchange: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpProfile {
    country: Option<String>,
    exchange_short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpFloat {
    float_shares: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn build_record_merges_endpoints() {
        let quote: FmpQuote = serde_json::from_str(
            r#"{"symbol":"ACME","price":3.5,"previousClose":3.0,"exchange":"NASDAQ","volume":1000}"#,
        )
        .unwrap();
        let profile: FmpProfile =
            serde_json::from_str(r#"{"country":"US","exchangeShortName":"NASDAQ"}"#).unwrap();
        let float: FmpFloat = serde_json::from_str(r#"{"floatShares":4000000}"#).unwrap();

        let record = build_record(&Symbol::new("ACME"), quote, Some(profile), Some(float));

        assert_eq!(record.price, Some(dec!(3.5)));
        assert_eq!(record.previous_close, Some(dec!(3)));
        assert_eq!(record.float_shares, Some(4_000_000));
        assert_eq!(record.exchange.as_deref(), Some("NASDAQ"));
        assert_eq!(record.country.as_deref(), Some("US"));
    }

    #[test]
    fn build_record_keeps_unknowns_distinct_from_zero() {
        let quote: FmpQuote = serde_json::from_str(r#"{"price":null,"exchange":""}"#).unwrap();
        let record = build_record(&Symbol::new("ZZZ"), quote, None, None);

        assert!(record.price.is_none());
        assert!(record.previous_close.is_none());
        assert!(record.float_shares.is_none());
        assert!(record.exchange.is_none());
        assert!(record.country.is_none());
    }

    #[test]
    fn profile_exchange_is_fallback() {
        let quote: FmpQuote = serde_json::from_str(r#"{"price":1.0}"#).unwrap();
        let profile: FmpProfile =
            serde_json::from_str(r#"{"country":"CN","exchangeShortName":"NYSE"}"#).unwrap();

        let record = build_record(&Symbol::new("BABA"), quote, Some(profile), None);
        assert_eq!(record.exchange.as_deref(), Some("NYSE"));
        assert_eq!(record.country.as_deref(), Some("CN"));
    }

    #[test]
    fn share_count_conversion() {
        assert_eq!(to_share_count(4_000_000.4), Some(4_000_000));
        assert_eq!(to_share_count(-1.0), None);
        assert_eq!(to_share_count(f64::NAN), None);
    }
}
