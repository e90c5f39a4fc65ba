use serde::{Deserialize, Serialize};

/// Retail chains and promo vocabulary that show up in Indonesian
/// headline feeds as advertorials.
pub const PROMO_TERMS: &[&str] = &[
    "promo",
    "diskon",
    "cashback",
    "voucher",
    "flash sale",
    "harga spesial",
    "beli 1 gratis 1",
    "katalog",
    "alfamart",
    "indomaret",
    "alfamidi",
    "hypermart",
    "superindo",
];

/// Title fragments that mark match previews and articles the upstream
/// has withdrawn.
pub const NOISE_TITLE_PATTERNS: &[&str] = &[" vs ", " vs. ", "[removed]"];

/// What the pipeline keeps and how much of it.
///
/// Deserializes from camelCase JSON with every field optional, so a caller
/// can send `{"resultLimit": 3}` and get the permissive defaults for the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterPolicy {
    pub exclude_terms: Vec<String>,
    pub min_title_length: usize,
    pub require_image: bool,
    pub require_source_name: bool,
    pub exclude_title_patterns: Vec<String>,
    pub result_limit: usize,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::passthrough(usize::MAX)
    }
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

impl FilterPolicy {
    /// Only drops untitled articles and duplicates, then truncates.
    pub fn passthrough(result_limit: usize) -> Self {
        Self {
            exclude_terms: Vec::new(),
            min_title_length: 0,
            require_image: false,
            require_source_name: false,
            exclude_title_patterns: Vec::new(),
            result_limit,
        }
    }

    /// Promo exclusion plus the full set of quality checks.
    pub fn strict(result_limit: usize) -> Self {
        Self {
            exclude_terms: owned(PROMO_TERMS),
            min_title_length: 15,
            require_image: true,
            require_source_name: true,
            exclude_title_patterns: owned(NOISE_TITLE_PATTERNS),
            result_limit,
        }
    }

    /// Promo exclusion and a short title floor, nothing else. Used when the
    /// strict pass came back empty.
    pub fn loose(result_limit: usize) -> Self {
        Self {
            exclude_terms: owned(PROMO_TERMS),
            min_title_length: 10,
            ..Self::passthrough(result_limit)
        }
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    pub fn with_exclude_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_title_length(mut self, min_title_length: usize) -> Self {
        self.min_title_length = min_title_length;
        self
    }
}
