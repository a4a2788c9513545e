//! Typed accessors for the job marketplace endpoints.

mod listing;
mod types;

use anyhow::Result;
use log::debug;
use reqwest::StatusCode;

pub use listing::{Listing, ObjectValues};
pub use types::{
    Alert, Author, Job, JobCategory, JobKind, JobPage, JobStatus, Pagination, Pricing, Tag, TagRef,
};

use crate::config::ClientConfig;
use crate::error::JobMarketError;
use crate::http::{HttpClient, RawResponse, Transport};
use crate::query::{JobFilters, QueryBuilder};

/// Public site prefix of offer pages.
pub const JOB_SITE_URL: &str = "https://jobmarket.dev/offers/";

/// Client for the job marketplace API.
pub struct JobMarketClient<T: Transport = HttpClient> {
    transport: T,
    base_url: String,
}

impl JobMarketClient<HttpClient> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpClient::new(&config)?;
        Ok(Self::with_transport(transport, &config.base_url))
    }

    /// Client configured from `JOBMARKET_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> JobMarketClient<T> {
    pub fn with_transport(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts an empty query bound to this client.
    pub fn query(&self) -> QueryBuilder<'_, T> {
        QueryBuilder::new(self)
    }

    /// Fetches one page of offers matching `filters`.
    #[tracing::instrument(skip(self))]
    pub async fn list_jobs(&self, filters: &JobFilters) -> Result<JobPage> {
        let response = self.fetch_listing(filters).await?;
        let page = listing::decode_job_page(&response.body)?;
        debug!(
            "Fetched {} jobs (page {}/{}, {} total)",
            page.jobs.len(),
            page.pagination.page.saturating_add(1),
            page.pagination.total_pages,
            page.pagination.total_items
        );
        Ok(page)
    }

    /// Number of offers matching `filters`, read from the listing's
    /// pagination without decoding any offer.
    #[tracing::instrument(skip(self))]
    pub async fn count_jobs(&self, filters: &JobFilters) -> Result<u64> {
        let response = self.fetch_listing(filters).await?;
        let pagination = listing::decode_pagination(&response.body)?;
        Ok(pagination.total_items)
    }

    /// Fetches one offer; `None` when the service does not know the id.
    #[tracing::instrument(skip(self))]
    pub async fn get_job(&self, id: &str) -> Result<Option<Job>> {
        if !is_valid_job_id(id) {
            return Err(JobMarketError::validation(format!(
                "Invalid job id {:?}: expected 24 hexadecimal characters",
                id
            ))
            .into());
        }

        let url = format!("{}/offers/{}", self.base_url, id);
        let response = self.transport.execute(&url, &[]).await?;

        if response.status == StatusCode::NOT_FOUND {
            debug!("Job {} not found", id);
            return Ok(None);
        }

        let response = ensure_success(response)?;
        Ok(Some(listing::decode_job(&response.body)?))
    }

    /// Lists every tag usable as an offer filter.
    #[tracing::instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        let url = format!("{}/tags/offers", self.base_url);
        let response = ensure_success(self.transport.execute(&url, &[]).await?)?;
        Ok(listing::decode_tags(&response.body)?)
    }

    async fn fetch_listing(&self, filters: &JobFilters) -> Result<RawResponse> {
        filters.validate()?;
        let url = format!("{}/offers", self.base_url);
        let response = self.transport.execute(&url, &filters.to_query()).await?;
        Ok(ensure_success(response)?)
    }
}

/// Turns any non-2xx response into an API error.
fn ensure_success(response: RawResponse) -> Result<RawResponse, JobMarketError> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(JobMarketError::api(response.status.as_u16(), response.body))
    }
}

/// Offer ids are 24 hexadecimal characters, either case.
pub fn is_valid_job_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Anything that identifies an offer page by slug.
pub trait JobSlug {
    fn slug(&self) -> &str;
}

impl JobSlug for Job {
    fn slug(&self) -> &str {
        &self.slug
    }
}

impl JobSlug for str {
    fn slug(&self) -> &str {
        self
    }
}

impl JobSlug for String {
    fn slug(&self) -> &str {
        self
    }
}

/// Public URL of an offer, from the offer itself or its bare slug.
pub fn build_job_url<S: JobSlug + ?Sized>(target: &S) -> String {
    format!("{}{}", JOB_SITE_URL, target.slug().trim_start_matches('/'))
}
