use async_trait::async_trait;

use crate::types::{Article, QuerySpec};
use crate::Result;

/// An upstream that can answer [`QuerySpec`]s with article lists.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Runs a single query. Any failure (transport, status, payload) is an `Err`.
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Article>>;
}
