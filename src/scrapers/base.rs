use crate::models::growth::PricePoint;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for daily price history sources
#[async_trait]
pub trait HistorySource {
    /// Name of the upstream this source talks to, used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch forward-adjusted daily closes for `symbol` from `start` onwards.
    /// Returns records in ascending date order with no duplicate dates;
    /// an empty upstream result is an error, never an empty vector.
    async fn fetch_history(&self, symbol: &str, start: &NaiveDate) -> Result<Vec<PricePoint>>;
}
