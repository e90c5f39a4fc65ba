use async_trait::async_trait;
use ng_core::{Article, Error, NewsSource, QueryMode, QuerySpec, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

use crate::config::UpstreamConfig;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Value>,
}

/// Client for a NewsAPI-compatible upstream (`top-headlines` and `everything`).
pub struct NewsApiClient {
    client: Client,
    config: UpstreamConfig,
}

impl NewsApiClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("newsgate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, mode: QueryMode) -> Result<Url> {
        let path = match mode {
            QueryMode::Headlines => "top-headlines",
            QueryMode::Search => "everything",
        };
        self.config
            .base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", path, e)))
    }
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

/// Query-string parameters for one request. Each endpoint only gets the
/// parameters it understands.
pub fn query_params(query: &QuerySpec) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    match query.mode {
        QueryMode::Headlines => {
            if let Some(country) = &query.country {
                params.push(("country", country.clone()));
            }
            if let Some(category) = &query.category {
                params.push(("category", category.clone()));
            }
            if let Some(q) = &query.keywords {
                params.push(("q", q.clone()));
            }
        }
        QueryMode::Search => {
            if let Some(q) = &query.keywords {
                params.push(("q", q.clone()));
            }
            if let Some(language) = &query.language {
                params.push(("language", language.clone()));
            }
            if let Some(sort_by) = query.sort_by {
                params.push(("sortBy", sort_by.as_str().to_string()));
            }
        }
    }
    params.push(("pageSize", query.page_size.to_string()));
    params
}

/// Turns a raw upstream reply into articles.
///
/// The upstream's own error message is logged here and goes no further:
/// callers only ever see the status and the error code.
pub fn parse_response(status: StatusCode, body: &str) -> Result<Vec<Article>> {
    let parsed: Option<NewsApiResponse> = serde_json::from_str(body).ok();

    let failed = !status.is_success() || parsed.as_ref().map_or(true, |r| r.status != "ok");
    if failed {
        let (code, message) = parsed
            .map(|r| (r.code, r.message))
            .unwrap_or_default();
        let code = code.unwrap_or_else(|| "unknown".to_string());
        warn!(
            status = status.as_u16(),
            code = %code,
            message = message.as_deref().unwrap_or(""),
            "upstream rejected query"
        );
        return Err(Error::Upstream {
            status: status.as_u16(),
            code,
        });
    }

    let raw_articles = parsed.map(|r| r.articles).unwrap_or_default();
    let total = raw_articles.len();
    let articles: Vec<Article> = raw_articles
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(article) => Some(article),
            Err(e) => {
                debug!(error = %e, "skipping malformed upstream article");
                None
            }
        })
        .collect();
    if articles.len() < total {
        debug!(kept = articles.len(), total, "some upstream articles were malformed");
    }
    Ok(articles)
}

#[async_trait]
impl NewsSource for NewsApiClient {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Article>> {
        let url = self.endpoint(query.mode)?;
        debug!(query = %query, "querying upstream");

        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .query(&query_params(query))
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;
        parse_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::SortOrder;

    #[test]
    fn test_headline_params() {
        let query = QuerySpec::headlines()
            .country("id")
            .language("id")
            .page_size(5);
        assert_eq!(
            query_params(&query),
            vec![("country", "id".to_string()), ("pageSize", "5".to_string())]
        );
    }

    #[test]
    fn test_search_params() {
        let query = QuerySpec::search("(indonesia OR jakarta)")
            .country("id")
            .sort_by(SortOrder::PublishedAt)
            .page_size(20);
        assert_eq!(
            query_params(&query),
            vec![
                ("q", "(indonesia OR jakarta)".to_string()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_endpoints_follow_base_url() {
        let config = UpstreamConfig::new("k")
            .unwrap()
            .with_base_url("http://localhost:9000/v2")
            .unwrap();
        let client = NewsApiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(QueryMode::Headlines).unwrap().as_str(),
            "http://localhost:9000/v2/top-headlines"
        );
        assert_eq!(
            client.endpoint(QueryMode::Search).unwrap().as_str(),
            "http://localhost:9000/v2/everything"
        );
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {"source": {"id": null, "name": "Kompas"}, "title": "Satu", "url": "https://a"},
                "garbage",
                {"source": {"id": "detik", "name": "Detik"}, "title": "Dua", "url": "https://b"}
            ]
        }"#;
        let articles = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].source_name(), Some("Detik"));
    }

    #[test]
    fn test_parse_error_response_hides_message() {
        let body = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key abc123 is invalid"}"#;
        let err = parse_response(StatusCode::UNAUTHORIZED, body).unwrap_err();
        match &err {
            Error::Upstream { status, code } => {
                assert_eq!(*status, 401);
                assert_eq!(code, "apiKeyInvalid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.to_string().contains("abc123"));
    }

    #[test]
    fn test_parse_error_status_in_ok_http_reply() {
        let body = r#"{"status": "error", "code": "rateLimited"}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, body),
            Err(Error::Upstream { status: 200, .. })
        ));
        assert!(matches!(
            parse_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            Err(Error::Upstream { status: 502, .. })
        ));
    }
}
