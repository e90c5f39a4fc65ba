//! Route profiles: the query batch, filter policy and optional fallback
//! behind each public endpoint.

use ng_core::policy::PROMO_TERMS;
use ng_core::{Article, FilterPolicy, QuerySpec, Result, SortOrder};
use ng_upstream::Orchestrator;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const EVERYTHING_QUERY: &str =
    "(indonesia OR jakarta) (technology OR business OR sports OR health)";

/// Page sizes above this are rejected by the upstream.
pub const MAX_LIMIT: usize = 100;

/// A broader batch tried once when the primary batch filters down to nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fallback {
    pub queries: Vec<QuerySpec>,
    pub policy: FilterPolicy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProfile {
    pub name: String,
    pub description: String,
    pub queries: Vec<QuerySpec>,
    pub policy: FilterPolicy,
    pub fallback: Option<Fallback>,
}

/// Per-request tweaks from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileOverrides {
    /// Replaces the keywords of every primary query.
    pub q: Option<String>,
    /// Overrides the result limit, capped at [`MAX_LIMIT`]. Page sizes are
    /// raised to match so the upstream can return that many.
    pub limit: Option<usize>,
    /// Skip the fallback and every filter except dropping untitled
    /// articles, dedup and the limit.
    pub raw: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub articles: Vec<Article>,
    pub fallback: bool,
}

pub fn builtin() -> Vec<RouteProfile> {
    vec![
        RouteProfile {
            name: "news".to_string(),
            description: "Indonesian headlines, promo-free".to_string(),
            queries: vec![
                QuerySpec::headlines().country("id").page_size(20),
                QuerySpec::search("indonesia")
                    .language("id")
                    .sort_by(SortOrder::PublishedAt)
                    .page_size(20),
                QuerySpec::search("jakarta")
                    .language("id")
                    .sort_by(SortOrder::PublishedAt)
                    .page_size(20),
            ],
            policy: FilterPolicy::strict(5),
            fallback: Some(Fallback {
                queries: vec![QuerySpec::search("indonesia")
                    .sort_by(SortOrder::PublishedAt)
                    .page_size(20)],
                policy: FilterPolicy::loose(5),
            }),
        },
        RouteProfile {
            name: "everything".to_string(),
            description: "Indonesian technology, business, sports and health coverage".to_string(),
            queries: vec![QuerySpec::search(EVERYTHING_QUERY)
                .sort_by(SortOrder::PublishedAt)
                .page_size(20)],
            policy: FilterPolicy::passthrough(20).with_exclude_terms(PROMO_TERMS.iter().copied()),
            fallback: None,
        },
        RouteProfile {
            name: "international".to_string(),
            description: "US top headlines".to_string(),
            queries: vec![QuerySpec::headlines().country("us").page_size(10)],
            policy: FilterPolicy::passthrough(10),
            fallback: None,
        },
    ]
}

fn raise_page_sizes(queries: &mut [QuerySpec], limit: usize) {
    let limit = u32::try_from(limit).unwrap_or(u32::MAX);
    for query in queries {
        query.page_size = query.page_size.max(limit);
    }
}

impl RouteProfile {
    pub fn with_overrides(&self, overrides: &ProfileOverrides) -> Self {
        let mut profile = self.clone();

        if let Some(q) = overrides.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            profile.queries = profile
                .queries
                .into_iter()
                .map(|query| query.keywords(q))
                .collect();
        }

        if overrides.raw.unwrap_or(false) {
            profile.policy = FilterPolicy::passthrough(profile.policy.result_limit);
            profile.fallback = None;
        }

        if let Some(limit) = overrides.limit {
            let limit = limit.min(MAX_LIMIT);
            profile.policy.result_limit = limit;
            raise_page_sizes(&mut profile.queries, limit);
            if let Some(fallback) = profile.fallback.as_mut() {
                fallback.policy.result_limit = limit;
                raise_page_sizes(&mut fallback.queries, limit);
            }
        }

        profile
    }

    /// Fetches and filters the primary batch, falling back once if that
    /// leaves nothing.
    ///
    /// A failing primary batch is returned as is. A failing fallback is not:
    /// the primary batch did succeed, so the caller gets its empty result.
    /// A zero limit empties every batch, so it never falls back.
    pub async fn resolve(&self, orchestrator: &Orchestrator) -> Result<Outcome> {
        let articles = orchestrator
            .fetch_and_filter(&self.queries, &self.policy)
            .await?;
        if !articles.is_empty() || self.policy.result_limit == 0 {
            return Ok(Outcome {
                articles,
                fallback: false,
            });
        }

        let Some(fallback) = &self.fallback else {
            return Ok(Outcome {
                articles,
                fallback: false,
            });
        };

        info!(profile = %self.name, "🔄 primary batch filtered to nothing, trying fallback");
        match orchestrator
            .fetch_and_filter(&fallback.queries, &fallback.policy)
            .await
        {
            Ok(articles) => Ok(Outcome {
                articles,
                fallback: true,
            }),
            Err(e) => {
                warn!(profile = %self.name, error = %e, "fallback batch failed");
                Ok(Outcome {
                    articles: Vec::new(),
                    fallback: false,
                })
            }
        }
    }
}
