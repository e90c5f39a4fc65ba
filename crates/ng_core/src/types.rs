use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// An article as returned by the upstream news source.
///
/// The record is kept exactly as it arrived and serialized back untouched,
/// `author`, `description`, `content` and explicit `null`s included. The
/// fields the filters look at are read out of it once, on the way in; a
/// record where one of them has the wrong type does not deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Article {
    source: Option<ArticleSource>,
    title: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
    record: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypedFields {
    #[serde(default)]
    source: Option<ArticleSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "urlToImage")]
    image_url: Option<String>,
}

impl TryFrom<Map<String, Value>> for Article {
    type Error = serde_json::Error;

    fn try_from(record: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let fields: TypedFields = serde_json::from_value(Value::Object(record.clone()))?;
        Ok(Self {
            source: fields.source,
            title: fields.title,
            url: fields.url,
            image_url: fields.image_url,
            record,
        })
    }
}

impl From<Article> for Map<String, Value> {
    fn from(article: Article) -> Self {
        article.record
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl Article {
    pub fn new(title: impl Into<String>) -> Self {
        Self::default().with_title(title)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.record.insert("title".to_string(), json!(title));
        self.title = Some(title);
        self
    }

    pub fn with_source(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.record
            .insert("source".to_string(), json!({ "id": null, "name": name }));
        self.source = Some(ArticleSource {
            id: None,
            name: Some(name),
        });
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.record.insert("urlToImage".to_string(), json!(url));
        self.image_url = Some(url);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.record.insert("url".to_string(), json!(url));
        self.url = Some(url);
        self
    }

    /// The title, or `None` when missing or blank.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_ref())
    }

    /// The title exactly as the upstream sent it.
    pub fn raw_title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The source name, or `None` when missing or blank.
    pub fn source_name(&self) -> Option<&str> {
        non_blank(self.source.as_ref().and_then(|s| s.name.as_ref()))
    }

    /// The image URL, or `None` when missing or blank.
    pub fn image(&self) -> Option<&str> {
        non_blank(self.image_url.as_ref())
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// `publishedAt` parsed as RFC 3339, or `None` when missing or not a
    /// timestamp. The record itself keeps whatever the upstream sent.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.record
            .get("publishedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Any field of the original record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }
}

/// Which upstream endpoint a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Headlines,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PublishedAt => "publishedAt",
            SortOrder::Relevancy => "relevancy",
            SortOrder::Popularity => "popularity",
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One upstream request. Built per incoming request and thrown away with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    pub mode: QueryMode,
    pub keywords: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<SortOrder>,
    pub page_size: u32,
}

impl QuerySpec {
    fn with_mode(mode: QueryMode) -> Self {
        Self {
            mode,
            keywords: None,
            language: None,
            country: None,
            category: None,
            sort_by: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn headlines() -> Self {
        Self::with_mode(QueryMode::Headlines)
    }

    pub fn search(keywords: impl Into<String>) -> Self {
        Self::with_mode(QueryMode::Search).keywords(keywords)
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn sort_by(mut self, sort_by: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            QueryMode::Headlines => "headlines",
            QueryMode::Search => "search",
        };
        write!(f, "{}[", mode)?;
        let params = [
            ("q", self.keywords.as_deref()),
            ("language", self.language.as_deref()),
            ("country", self.country.as_deref()),
            ("category", self.category.as_deref()),
            ("sortBy", self.sort_by.as_ref().map(SortOrder::as_str)),
        ];
        for (key, value) in params.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))) {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "pageSize={}]", self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_keeps_unknown_fields() {
        let raw = json!({
            "source": {"id": null, "name": "Kompas"},
            "author": "Redaksi",
            "title": "Pemerintah Umumkan Kebijakan Baru",
            "description": "Ringkasan",
            "url": "https://kompas.com/a",
            "urlToImage": "https://kompas.com/a.jpg",
            "publishedAt": "2024-03-01T08:00:00Z",
            "content": "Isi berita"
        });

        let article: Article = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(article.source_name(), Some("Kompas"));
        assert_eq!(article.image(), Some("https://kompas.com/a.jpg"));
        assert_eq!(article.url(), Some("https://kompas.com/a"));
        assert!(article.published_at().is_some());
        assert_eq!(article.get("author"), Some(&json!("Redaksi")));

        let back = serde_json::to_value(&article).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_record_is_serialized_as_received() {
        let raw = json!({
            "source": {"id": null, "name": "Detik"},
            "title": "Gempa Jakarta",
            "urlToImage": null,
            "publishedAt": "2024-03-01T08:00:00+07:00"
        });

        let article: Article = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(
            article.published_at().map(|dt| dt.to_rfc3339()),
            Some("2024-03-01T01:00:00+00:00".to_string())
        );
        assert_eq!(
            serde_json::to_string(&article).unwrap(),
            serde_json::to_string(&raw).unwrap()
        );
    }

    #[test]
    fn test_bad_timestamp_is_absent_but_kept() {
        let raw = json!({"title": "x", "publishedAt": "2024-03-01 08:00"});
        let article: Article = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(article.published_at(), None);
        assert_eq!(serde_json::to_value(&article).unwrap(), raw);
    }

    #[test]
    fn test_wrongly_typed_field_is_malformed() {
        let result: std::result::Result<Article, _> =
            serde_json::from_value(json!({"title": "x", "source": "Kompas"}));
        assert!(result.is_err());
        assert!(serde_json::from_value::<Article>(json!(42)).is_err());
    }

    #[test]
    fn test_builders_write_the_record() {
        let article = Article::new("Gempa Jakarta").with_source("Kompas").with_image("img");
        assert_eq!(
            serde_json::to_value(&article).unwrap(),
            json!({
                "title": "Gempa Jakarta",
                "source": {"id": null, "name": "Kompas"},
                "urlToImage": "img"
            })
        );
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let article: Article = serde_json::from_value(json!({
            "title": "   ",
            "source": {"name": ""},
            "urlToImage": null
        }))
        .unwrap();
        assert_eq!(article.title(), None);
        assert_eq!(article.source_name(), None);
        assert_eq!(article.image(), None);
    }

    #[test]
    fn test_query_display() {
        let query = QuerySpec::search("jakarta")
            .language("id")
            .sort_by(SortOrder::PublishedAt)
            .page_size(10);
        assert_eq!(
            query.to_string(),
            "search[q=jakarta language=id sortBy=publishedAt pageSize=10]"
        );
        assert_eq!(QuerySpec::headlines().to_string(), "headlines[pageSize=20]");
    }
}
