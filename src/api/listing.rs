//! Decoding of list-shaped response bodies.
//!
//! The service returns collections either as a JSON array or as an object
//! keyed by numeric strings. Both collapse here into one ordered `Vec`,
//! values taken in the order they appear in the document.

use serde::de::{self, DeserializeOwned, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;

use super::types::{Job, JobPage, Pagination, Tag};
use crate::error::JobMarketError;

/// Collection accepted as an array or as an object of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T>(pub Vec<T>);

/// Collection that must be encoded as an object of values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValues<T>(pub Vec<T>);

struct ValuesVisitor<T> {
    accept_array: bool,
    marker: PhantomData<T>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for ValuesVisitor<T> {
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.accept_array {
            f.write_str("an array or an object of values")
        } else {
            f.write_str("an object of values")
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        if !self.accept_array {
            return Err(de::Error::invalid_type(de::Unexpected::Seq, &self));
        }
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(values)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((_key, value)) = map.next_entry::<IgnoredAny, T>()? {
            values.push(value);
        }
        Ok(values)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Listing<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(ValuesVisitor {
                accept_array: true,
                marker: PhantomData,
            })
            .map(Listing)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ObjectValues<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(ValuesVisitor {
                accept_array: false,
                marker: PhantomData,
            })
            .map(ObjectValues)
    }
}

#[derive(Deserialize)]
struct ListEnvelope<R> {
    results: Option<R>,
    pagination: Option<Pagination>,
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, JobMarketError> {
    serde_json::from_str(body)
        .map_err(|e| JobMarketError::validation(format!("Malformed {} response: {}", what, e)))
}

/// Decodes `{results, pagination}` into a page of jobs.
pub fn decode_job_page(body: &str) -> Result<JobPage, JobMarketError> {
    let envelope: ListEnvelope<Listing<Job>> = decode(body, "job listing")?;
    match (envelope.results, envelope.pagination) {
        (Some(Listing(jobs)), Some(pagination)) => Ok(JobPage { jobs, pagination }),
        _ => Err(JobMarketError::validation(
            "Job listing response is missing `results` or `pagination`",
        )),
    }
}

/// Decodes only the pagination of a listing; job bodies are skipped unparsed.
pub fn decode_pagination(body: &str) -> Result<Pagination, JobMarketError> {
    let envelope: ListEnvelope<IgnoredAny> = decode(body, "job listing")?;
    match (envelope.results, envelope.pagination) {
        (Some(_), Some(pagination)) => Ok(pagination),
        _ => Err(JobMarketError::validation(
            "Job listing response is missing `results` or `pagination`",
        )),
    }
}

/// Decodes the tag catalogue, an object whose values are tags.
pub fn decode_tags(body: &str) -> Result<Vec<Tag>, JobMarketError> {
    let ObjectValues(tags) = decode(body, "tag list")?;
    Ok(tags)
}

pub fn decode_job(body: &str) -> Result<Job, JobMarketError> {
    decode(body, "job")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PAGINATION: &str = r#""pagination": {"totalItems": 2, "totalPages": 1, "page": 0}"#;

    #[test]
    fn test_listing_from_array() {
        let Listing(values): Listing<u32> = serde_json::from_str("[3, 1, 2]").unwrap();
        assert_eq!(values, vec![3, 1, 2]);
    }

    #[test]
    fn test_listing_from_object_keeps_document_order() {
        let Listing(values): Listing<String> =
            serde_json::from_str(r#"{"10": "ten", "2": "two", "0": "zero"}"#).unwrap();
        assert_eq!(values, vec!["ten", "two", "zero"]);
    }

    #[test]
    fn test_listing_rejects_scalars() {
        assert!(serde_json::from_str::<Listing<u32>>("42").is_err());
        assert!(serde_json::from_str::<Listing<u32>>(r#""abc""#).is_err());
    }

    #[test]
    fn test_object_values_rejects_array() {
        let err = serde_json::from_str::<ObjectValues<u32>>("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn test_decode_job_page_array_and_object_agree() {
        let as_array = format!(
            r#"{{"results": [{{"_id": "a"}}, {{"_id": "b"}}], {}}}"#,
            PAGINATION
        );
        let as_object = format!(
            r#"{{"results": {{"0": {{"_id": "a"}}, "1": {{"_id": "b"}}}}, {}}}"#,
            PAGINATION
        );

        let from_array = decode_job_page(&as_array).unwrap();
        let from_object = decode_job_page(&as_object).unwrap();

        assert_eq!(from_array, from_object);
        assert_eq!(from_array.jobs[1].id, "b");
        assert_eq!(from_array.pagination.total_items, 2);
    }

    #[test]
    fn test_decode_job_page_tolerates_offer_without_id() {
        let body = format!(r#"{{"results": [{{"slug": "a"}}, {{"_id": "b"}}], {}}}"#, PAGINATION);
        let page = decode_job_page(&body).unwrap();
        assert_eq!(page.jobs.len(), 2);
        assert_eq!(page.jobs[0].id, "");
        assert_eq!(page.jobs[0].slug, "a");
    }

    #[test]
    fn test_decode_job_page_missing_fields() {
        let err = decode_job_page(r#"{"results": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = decode_job_page(&format!("{{{}}}", PAGINATION)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = decode_job_page("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_decode_pagination_skips_job_bodies() {
        // Results that would never decode as jobs are still accepted
        let body = format!(r#"{{"results": [1, "x", null], {}}}"#, PAGINATION);
        let pagination = decode_pagination(&body).unwrap();
        assert_eq!(pagination.total_items, 2);

        assert!(decode_pagination(r#"{"results": []}"#).is_err());
    }

    #[test]
    fn test_decode_tags() {
        let body = r#"{
            "b": {"_id": "2", "name": "rust"},
            "a": {"_id": "1", "name": "design", "slug": "design"}
        }"#;
        let tags = decode_tags(body).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "rust");
        assert_eq!(tags[1].slug.as_deref(), Some("design"));

        // One incomplete tag does not sink the catalogue
        let tags = decode_tags(r#"{"a": {"_id": "1"}, "b": {"_id": "2", "name": "rust"}}"#).unwrap();
        assert_eq!(tags[0].name, "");
        assert_eq!(tags[1].name, "rust");

        let err = decode_tags(r#"[{"_id": "1", "name": "x"}]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
