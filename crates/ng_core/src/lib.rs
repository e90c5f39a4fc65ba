pub mod error;
pub mod pipeline;
pub mod policy;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use pipeline::{filter, filter_value};
pub use policy::FilterPolicy;
pub use source::NewsSource;
pub use types::{Article, ArticleSource, QueryMode, QuerySpec, SortOrder};

pub mod prelude {
    pub use super::{Article, Error, FilterPolicy, NewsSource, QuerySpec, Result};
}
