//! Trait seams between the pipeline and its collaborators.
//!
//! The pipeline never talks to `reqwest` or a language model directly. It goes
//! through [`Fetch`] for network access and [`Summarizer`] for turning sections
//! into prose, so either side can be swapped for a scripted implementation in
//! tests or for a different transport in production.

use super::config::EdgarUrls;
use super::core::FetchResponse;
use super::error::Result;
use super::parsing::sections::Sections;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Network access used by the resolver and the fetch pipeline.
///
/// Implementations return only successful responses (status below 400) and
/// classify failures as [`EdgarError::RemoteRejected`](crate::EdgarError::RemoteRejected)
/// or [`EdgarError::TransportFailure`](crate::EdgarError::TransportFailure).
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs a GET request with optional query parameters.
    async fn get(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<FetchResponse>;
    /// The user agent recorded in provenance manifests.
    fn user_agent(&self) -> &str;
    /// Base URLs for building catalog, ticker map and archive URLs.
    fn urls(&self) -> &EdgarUrls;
}

/// Turns extracted sections into a text summary.
///
/// This is where a language-model completion service plugs in; the crate
/// itself ships no implementation.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, meta: &BTreeMap<String, Value>, sections: &Sections)
    -> Result<String>;
}
