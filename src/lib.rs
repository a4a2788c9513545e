//! Client for the job marketplace HTTP API.
//!
//! ```no_run
//! use jobmarket::{ClientConfig, JobCategory, JobMarketClient};
//! use std::time::Duration;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = JobMarketClient::new(ClientConfig::default())?;
//!
//! let designers = client
//!     .query()
//!     .category(JobCategory::Designer)
//!     .volunteer(false)
//!     .execute_all(Duration::from_millis(500), Some(5))
//!     .await?;
//!
//! for job in &designers {
//!     println!("{} {}", job.title, job.url());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod query;

pub use api::{
    Alert, Author, Job, JobCategory, JobKind, JobMarketClient, JobPage, JobStatus, Pagination,
    Pricing, Tag, TagRef, build_job_url, is_valid_job_id,
};
pub use config::ClientConfig;
pub use error::{ErrorKind, JobMarketError};
pub use http::{HttpClient, RawResponse, Transport};
pub use query::{JobFilters, QueryBuilder};
