//! Provider implementation for the citywaste.or.kr discharge quantity API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use citywaste_core::{
    model::{DateRange, DischargeRecord, FirstPage, QueryIdentity},
    ports::{DischargePort, FetchError},
};

const BASE_URL: &str =
    "https://www.citywaste.or.kr/portal/status/selectDischargerQuantityQuickMonthNew.do";
const DATE_FORMAT: &str = "%Y%m%d";

/// Response of the first page, which carries the monthly summary.
#[derive(Debug, Deserialize)]
struct FirstPageResponse {
    #[serde(rename = "totalCnt")]
    total_count: i64,
    #[serde(rename = "paginationInfo")]
    pagination: PaginationInfo,
    #[serde(rename = "ctznnm")]
    address: String,
    list: Vec<RecordEntry>,
    // plenty of other fields exist, we ignore them
}

#[derive(Debug, Deserialize)]
struct PaginationInfo {
    #[serde(rename = "totalPageCount")]
    total_page_count: u32,
}

/// Any later page; only the records matter there.
#[derive(Debug, Deserialize)]
struct PageResponse {
    list: Vec<RecordEntry>,
}

#[derive(Debug, Deserialize)]
struct RecordEntry {
    #[serde(rename = "qtyvalue")]
    kg: f64,
    #[serde(rename = "dttime")]
    date: String,
}

impl From<RecordEntry> for DischargeRecord {
    fn from(entry: RecordEntry) -> Self {
        DischargeRecord {
            kg: entry.kg,
            date: entry.date,
        }
    }
}

/// Discharge backend talking to the citywaste web portal.
pub struct CityWastePort {
    client: Client,
    base_url: String,
}

impl CityWastePort {
    /// Create a new port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_owned(),
        }
    }

    /// Point the port at a different endpoint.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, query: &QueryIdentity, range: DateRange, index: u32) -> RequestBuilder {
        self.client.get(&self.base_url).query(&[
            ("tagprintcd", query.tag_code.clone()),
            ("aptdong", query.dong.to_string()),
            ("apthono", query.ho.to_string()),
            ("startchdate", range.start.format(DATE_FORMAT).to_string()),
            ("endchdate", range.end.format(DATE_FORMAT).to_string()),
            ("pageIndex", index.to_string()),
        ])
    }
}

#[async_trait]
impl DischargePort for CityWastePort {
    async fn first_page(
        &self,
        query: &QueryIdentity,
        range: DateRange,
    ) -> Result<FirstPage, FetchError> {
        let resp =
            fetch_json::<FirstPageResponse>(&self.client, self.request(query, range, 1)).await?;

        Ok(FirstPage {
            total_count: resp.total_count,
            total_pages: resp.pagination.total_page_count,
            address: resp.address,
            records: resp.list.into_iter().map(DischargeRecord::from).collect(),
        })
    }

    async fn page(
        &self,
        query: &QueryIdentity,
        range: DateRange,
        index: u32,
    ) -> Result<Vec<DischargeRecord>, FetchError> {
        let resp =
            fetch_json::<PageResponse>(&self.client, self.request(query, range, index)).await?;

        Ok(resp.list.into_iter().map(DischargeRecord::from).collect())
    }
}

// Fetch and decode JSON, retrying a 404 once against the very same URL.
async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    req: RequestBuilder,
) -> Result<T, FetchError> {
    let request = req.build()?;
    let url = request.url().clone();
    info!(%url, "requesting discharge page");

    let mut resp = client.execute(request).await?;
    if resp.status() == StatusCode::NOT_FOUND {
        info!(%url, "page not found, retrying once");
        resp = client.get(url.clone()).send().await?;
    }

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| FetchError::Parse {
        url: url.to_string(),
        source,
    })
}
