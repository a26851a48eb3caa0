use crate::api_client::{QuerySpec, Report};
use crate::error::Result;

/// Trait for abstracting where report pages come from.
/// This allows the builder to work against the live API or a scripted fake.
pub trait ReportSource {
    /// Fetch one page of results for the given query, at the given page
    /// size, optionally continuing from a token returned by a prior page.
    fn fetch_page(
        &self,
        query: &QuerySpec,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<Report>;
}
