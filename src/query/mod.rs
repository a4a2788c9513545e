//! Fluent query builder over the offer listing.
//!
//! A [`QueryBuilder`] accumulates [`JobFilters`] through chained setters
//! and runs them in one of several modes: a single page, every page
//! collected eagerly, a lazy stream of offers, or a bare count.

mod filters;

use anyhow::Result;
use futures_util::stream::{self, Stream, TryStreamExt};
use log::debug;
use std::collections::VecDeque;
use std::time::Duration;

pub use filters::JobFilters;

use crate::api::{Job, JobCategory, JobKind, JobMarketClient, JobPage, JobStatus};
use crate::http::{HttpClient, Transport};

/// Accumulates listing filters and executes them against a client.
///
/// Setters return the same builder so calls chain; the builder is
/// reusable after any execution and after [`QueryBuilder::reset`].
pub struct QueryBuilder<'a, T: Transport = HttpClient> {
    client: &'a JobMarketClient<T>,
    filters: JobFilters,
}

impl<'a, T: Transport> QueryBuilder<'a, T> {
    pub fn new(client: &'a JobMarketClient<T>) -> Self {
        Self {
            client,
            filters: JobFilters::default(),
        }
    }

    pub fn volunteer(&mut self, volunteer: bool) -> &mut Self {
        self.filters.volunteer = Some(volunteer);
        self
    }

    pub fn page(&mut self, page: i64) -> &mut Self {
        self.filters.page = Some(page);
        self
    }

    /// Replaces the tag filter.
    pub fn tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Appends one tag to the tag filter.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.filters
            .tags
            .get_or_insert_with(Vec::new)
            .push(tag.into());
        self
    }

    pub fn kind(&mut self, kind: JobKind) -> &mut Self {
        self.filters.kind = Some(kind);
        self
    }

    pub fn status(&mut self, status: JobStatus) -> &mut Self {
        self.filters.status = Some(status);
        self
    }

    pub fn category(&mut self, category: JobCategory) -> &mut Self {
        self.filters.category = Some(category);
        self
    }

    pub fn reset(&mut self) -> &mut Self {
        self.filters = JobFilters::default();
        self
    }

    /// Snapshot of the current filters.
    pub fn build(&self) -> JobFilters {
        self.filters.clone()
    }

    pub fn filters(&self) -> &JobFilters {
        &self.filters
    }

    /// Fetches a single page with the current filters.
    pub async fn execute(&self) -> Result<JobPage> {
        self.client.list_jobs(&self.build()).await
    }

    /// Like [`QueryBuilder::execute`], without the pagination.
    pub async fn execute_and_get_results(&self) -> Result<Vec<Job>> {
        Ok(self.execute().await?.jobs)
    }

    /// Walks every page from 0 and collects all offers in order.
    ///
    /// Waits `delay` between two fetches, never after the last page. The
    /// whole result set is held in memory; prefer [`QueryBuilder::stream`]
    /// for large listings.
    pub async fn execute_all(&self, delay: Duration, max_pages: Option<u32>) -> Result<Vec<Job>> {
        self.stream(delay, max_pages).try_collect().await
    }

    /// Lazily walks every page from 0, yielding offers one at a time.
    ///
    /// A page is fetched only once the previous one has been consumed, so
    /// dropping the stream early leaves nothing in flight. Each call starts
    /// its own walk over a snapshot of the filters. The first error ends
    /// the stream.
    pub fn stream(
        &self,
        delay: Duration,
        max_pages: Option<u32>,
    ) -> impl Stream<Item = Result<Job>> + use<'a, T> {
        let walk = PageWalk::new(self.client, self.build(), delay, max_pages);
        stream::unfold(walk, PageWalk::next_job)
    }

    /// Total number of matching offers, from a single page-0 request.
    pub async fn count(&self) -> Result<u64> {
        let mut filters = self.build();
        filters.page = Some(0);
        self.client.count_jobs(&filters).await
    }
}

/// State of one pass over the listing.
struct PageWalk<'a, T: Transport> {
    client: &'a JobMarketClient<T>,
    filters: JobFilters,
    delay: Duration,
    max_pages: Option<u32>,
    next_page: i64,
    pages_fetched: u32,
    buffer: VecDeque<Job>,
    exhausted: bool,
}

impl<'a, T: Transport> PageWalk<'a, T> {
    fn new(
        client: &'a JobMarketClient<T>,
        filters: JobFilters,
        delay: Duration,
        max_pages: Option<u32>,
    ) -> Self {
        Self {
            client,
            filters,
            delay,
            max_pages,
            next_page: 0,
            pages_fetched: 0,
            buffer: VecDeque::new(),
            exhausted: max_pages == Some(0),
        }
    }

    async fn next_job(mut self) -> Option<(Result<Job>, Self)> {
        loop {
            if let Some(job) = self.buffer.pop_front() {
                return Some((Ok(job), self));
            }
            if self.exhausted {
                return None;
            }

            if self.pages_fetched > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if let Err(e) = self.fetch_next_page().await {
                self.exhausted = true;
                return Some((Err(e), self));
            }
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let mut filters = self.filters.clone();
        filters.page = Some(self.next_page);

        let page = self.client.list_jobs(&filters).await?;
        self.pages_fetched = self.pages_fetched.saturating_add(1);
        self.next_page += 1;

        let limit_reached = self.max_pages.is_some_and(|max| self.pages_fetched >= max);
        if page.pagination.is_last_page() || page.jobs.is_empty() || limit_reached {
            debug!(
                "Listing walk finished after {} page(s) of {}",
                self.pages_fetched, page.pagination.total_pages
            );
            self.exhausted = true;
        }

        self.buffer.extend(page.jobs);
        Ok(())
    }
}
