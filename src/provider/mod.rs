//! The backend seam: anything that can turn a query into a result set.

use std::collections::BTreeMap;
use std::future::Future;

use crate::domain::{Query, ResultPage};
use crate::error::ProviderError;

pub mod memory;


pub use memory::InMemoryProvider;

#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub query: Query,
    pub filters: BTreeMap<String, String>,
    pub max_results: usize,
}

/// Executes one search. Failures come back as [`ProviderError`]; the
/// controller never retries on its own.
pub trait SearchProvider: Send + Sync + 'static {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<ResultPage, ProviderError>> + Send;
}
