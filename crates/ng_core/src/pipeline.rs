//! The article filter pipeline.
//!
//! Stages run in a fixed order and each one only sees what the previous
//! one kept: exclusion, quality, deduplication, truncation.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::policy::FilterPolicy;
use crate::types::Article;
use crate::{Error, Result};

/// Runs `candidates` through every stage of `policy`.
///
/// Pure: no I/O, no state kept between calls. Missing fields never fail,
/// they just fail the predicate that needed them.
pub fn filter(candidates: &[Article], policy: &FilterPolicy) -> Vec<Article> {
    let exclude_terms = lowercased(&policy.exclude_terms);
    let title_patterns = lowercased(&policy.exclude_title_patterns);

    let survivors: Vec<&Article> = candidates
        .iter()
        .filter(|article| !is_excluded(article, &exclude_terms))
        .collect();
    let after_exclusion = survivors.len();

    let survivors: Vec<&Article> = survivors
        .into_iter()
        .filter(|article| passes_quality(article, policy, &title_patterns))
        .collect();
    let after_quality = survivors.len();

    let mut seen = HashSet::new();
    let survivors: Vec<&Article> = survivors
        .into_iter()
        .filter(|article| seen.insert(article.raw_title().unwrap_or_default()))
        .collect();
    let after_dedup = survivors.len();

    let kept: Vec<Article> = survivors
        .into_iter()
        .take(policy.result_limit)
        .cloned()
        .collect();

    debug!(
        candidates = candidates.len(),
        after_exclusion,
        after_quality,
        after_dedup,
        kept = kept.len(),
        "filter pipeline finished"
    );
    kept
}

/// Like [`filter`], for input that has not been typed yet.
///
/// Anything other than a JSON array is `Error::InvalidInput`. Elements that
/// are not article objects are dropped like any other rejected article.
pub fn filter_value(candidates: &Value, policy: &FilterPolicy) -> Result<Vec<Article>> {
    let items = candidates.as_array().ok_or_else(|| {
        Error::InvalidInput(format!(
            "expected an array of articles, got {}",
            json_kind(candidates)
        ))
    })?;

    let articles: Vec<Article> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item.clone()) {
            Ok(article) => Some(article),
            Err(e) => {
                debug!(index, error = %e, "dropping malformed article");
                None
            }
        })
        .collect();

    Ok(filter(&articles, policy))
}

// An empty term is a substring of everything and rejects every article.
fn lowercased(terms: &[String]) -> Vec<String> {
    terms.iter().map(|t| t.to_lowercase()).collect()
}

fn is_excluded(article: &Article, terms: &[String]) -> bool {
    if terms.is_empty() {
        return false;
    }
    let title_lower = article.raw_title().unwrap_or_default().to_lowercase();
    let source_lower = article.source_name().unwrap_or_default().to_lowercase();
    terms
        .iter()
        .any(|term| title_lower.contains(term.as_str()) || source_lower.contains(term.as_str()))
}

fn passes_quality(article: &Article, policy: &FilterPolicy, title_patterns: &[String]) -> bool {
    let Some(title) = article.title() else {
        return false;
    };
    if title.chars().count() < policy.min_title_length {
        return false;
    }
    if policy.require_source_name && article.source_name().is_none() {
        return false;
    }
    if policy.require_image && article.image().is_none() {
        return false;
    }
    let title_lower = title.to_lowercase();
    !title_patterns
        .iter()
        .any(|pattern| title_lower.contains(pattern.as_str()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
