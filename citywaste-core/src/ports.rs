//! Traits describing the discharge service and its failure modes.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{DateRange, DischargeRecord, FirstPage, QueryIdentity};

#[derive(thiserror::Error, Debug)]
/// Errors that abort a fetch cycle.
pub enum FetchError {
    /// Connection failure, timeout, or an unreadable body.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Non-success status, after the 404 retry where applicable.
    #[error("Unexpected status {status} for {url}")]
    Status {
        /// URL that was requested.
        url: String,
        /// HTTP status code of the final response.
        status: u16,
    },
    /// Body was not JSON or lacked the expected fields.
    #[error("Parse error for {url}: {source}")]
    Parse {
        /// URL that was requested.
        url: String,
        /// Decoder failure.
        #[source]
        source: JsonError,
    },
    /// Page count that the reported record count cannot fill.
    #[error("Implausible page count {total_pages} for {total_count} records")]
    PageCount {
        /// `totalPageCount` as reported.
        total_pages: u32,
        /// `totalCnt` as reported.
        total_count: i64,
    },
}

#[async_trait]
/// Backend returning the paginated discharge records of a household.
pub trait DischargePort: Send + Sync {
    /// Fetch page 1 together with the summary fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request or decoding fails.
    async fn first_page(
        &self,
        query: &QueryIdentity,
        range: DateRange,
    ) -> Result<FirstPage, FetchError>;

    /// Fetch the records of page `index` (1-based).
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request or decoding fails.
    async fn page(
        &self,
        query: &QueryIdentity,
        range: DateRange,
        index: u32,
    ) -> Result<Vec<DischargeRecord>, FetchError>;
}
