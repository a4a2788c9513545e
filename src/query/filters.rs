use crate::api::{JobCategory, JobKind, JobStatus};
use crate::error::JobMarketError;

/// Filters accepted by the offer listing.
///
/// Values are plain data: cloning a `JobFilters` gives an independent
/// snapshot that later builder calls cannot touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilters {
    pub volunteer: Option<bool>,
    /// 0-based page index; negative values are rejected before sending.
    pub page: Option<i64>,
    /// Tag ids, in the order given. Duplicates are kept.
    pub tags: Option<Vec<String>>,
    pub kind: Option<JobKind>,
    pub status: Option<JobStatus>,
    pub category: Option<JobCategory>,
}

impl JobFilters {
    pub fn is_empty(&self) -> bool {
        *self == JobFilters::default()
    }

    pub fn validate(&self) -> Result<(), JobMarketError> {
        match self.page {
            Some(page) if page < 0 => Err(JobMarketError::validation(format!(
                "Page must be greater than or equal to 0, got {}",
                page
            ))),
            _ => Ok(()),
        }
    }

    /// Query parameters for the present filters.
    ///
    /// Tags go out as one repeated `tags` parameter per id.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();

        if let Some(volunteer) = self.volunteer {
            query.push(("volunteer".to_string(), volunteer.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(tags) = &self.tags {
            query.extend(tags.iter().map(|tag| ("tags".to_string(), tag.clone())));
        }
        if let Some(kind) = self.kind {
            query.push(("kind".to_string(), kind.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category".to_string(), category.to_string()));
        }

        query
    }
}
