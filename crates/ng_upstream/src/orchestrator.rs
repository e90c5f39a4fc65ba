use std::sync::Arc;

use futures::future::join_all;
use ng_core::{pipeline, Article, Error, FilterPolicy, NewsSource, QuerySpec, Result};
use tracing::{info, warn};

/// Fans a batch of queries out to the upstream and merges what comes back.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn NewsSource>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Runs every query concurrently and waits for all of them to settle.
    ///
    /// Articles are appended in query order, whatever order the replies
    /// arrive in. Failed queries are logged and skipped; only a batch where
    /// every query failed is an error.
    pub async fn fetch_candidates(&self, queries: &[QuerySpec]) -> Result<Vec<Article>> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(queries.iter().map(|query| self.source.fetch(query))).await;

        let mut candidates = Vec::new();
        let mut failures = 0;
        for (index, (query, result)) in queries.iter().zip(results).enumerate() {
            match result {
                Ok(mut articles) => {
                    info!(index, query = %query, count = articles.len(), "📰 upstream query returned");
                    candidates.append(&mut articles);
                }
                Err(e) => {
                    failures += 1;
                    warn!(index, query = %query, error = %e, "⚠️ upstream query failed, skipping");
                }
            }
        }

        if failures == queries.len() {
            return Err(Error::UpstreamUnavailable {
                attempted: queries.len(),
            });
        }

        info!(
            source = self.source.name(),
            queries = queries.len(),
            failures,
            candidates = candidates.len(),
            "✨ merged candidate list"
        );
        Ok(candidates)
    }

    /// [`fetch_candidates`](Self::fetch_candidates) followed by the filter pipeline.
    pub async fn fetch_and_filter(
        &self,
        queries: &[QuerySpec],
        policy: &FilterPolicy,
    ) -> Result<Vec<Article>> {
        let candidates = self.fetch_candidates(queries).await?;
        Ok(pipeline::filter(&candidates, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Answers by keyword; a keyword with no entry fails.
    struct MockSource {
        responses: HashMap<String, (u64, Vec<Article>)>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn respond(mut self, keywords: &str, delay_ms: u64, titles: &[&str]) -> Self {
            let articles = titles
                .iter()
                .map(|t| Article::new(*t).with_source(keywords))
                .collect();
            self.responses.insert(keywords.to_string(), (delay_ms, articles));
            self
        }
    }

    #[async_trait]
    impl NewsSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Article>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let keywords = query.keywords.clone().unwrap_or_default();
            match self.responses.get(&keywords) {
                Some((delay_ms, articles)) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    Ok(articles.clone())
                }
                None => Err(Error::Upstream {
                    status: 500,
                    code: "unexpectedError".to_string(),
                }),
            }
        }
    }

    fn numbered(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{} {}", prefix, i)).collect()
    }

    #[tokio::test]
    async fn test_all_queries_failing_is_unavailable() {
        let source = Arc::new(MockSource::new());
        let orchestrator = Orchestrator::new(source.clone());
        let queries = vec![
            QuerySpec::search("a"),
            QuerySpec::search("b"),
            QuerySpec::search("c"),
        ];

        let result = orchestrator.fetch_and_filter(&queries, &FilterPolicy::default()).await;
        assert!(matches!(result, Err(Error::UpstreamUnavailable { attempted: 3 })));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_partial_failure_merges_in_query_order() {
        let first = numbered("satu", 5);
        let second = numbered("dua", 7);
        let first_refs: Vec<&str> = first.iter().map(String::as_str).collect();
        let second_refs: Vec<&str> = second.iter().map(String::as_str).collect();

        // The first query answers last; the merge must not care.
        let source = MockSource::new()
            .respond("one", 50, &first_refs)
            .respond("two", 0, &second_refs);
        let orchestrator = Orchestrator::new(Arc::new(source));
        let queries = vec![
            QuerySpec::search("one"),
            QuerySpec::search("broken"),
            QuerySpec::search("two"),
        ];

        let candidates = orchestrator.fetch_candidates(&queries).await.unwrap();
        assert_eq!(candidates.len(), 12);
        let titles: Vec<String> = candidates
            .iter()
            .filter_map(|a| a.title().map(str::to_string))
            .collect();
        let expected: Vec<String> = first.into_iter().chain(second).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn test_fetch_and_filter_dedups_across_queries() {
        let source = MockSource::new()
            .respond("one", 10, &["Gempa Jakarta", "Promo Diskon Akhir Tahun"])
            .respond("two", 0, &["Gempa Jakarta", "Harga beras turun"]);
        let orchestrator = Orchestrator::new(Arc::new(source));
        let queries = vec![QuerySpec::search("one"), QuerySpec::search("two")];
        let policy = FilterPolicy::passthrough(10).with_exclude_terms(["promo"]);

        let kept = orchestrator.fetch_and_filter(&queries, &policy).await.unwrap();
        let titles: Vec<_> = kept.iter().filter_map(Article::title).collect();
        assert_eq!(titles, vec!["Gempa Jakarta", "Harga beras turun"]);
        assert_eq!(kept[0].source_name(), Some("one"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty_success() {
        let orchestrator = Orchestrator::new(Arc::new(MockSource::new()));
        assert!(orchestrator.fetch_candidates(&[]).await.unwrap().is_empty());
    }
}
