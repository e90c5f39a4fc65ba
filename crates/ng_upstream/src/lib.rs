pub mod config;
pub mod newsapi;
pub mod orchestrator;

pub use config::UpstreamConfig;
pub use newsapi::NewsApiClient;
pub use orchestrator::Orchestrator;

pub mod prelude {
    pub use super::{NewsApiClient, Orchestrator, UpstreamConfig};
    pub use ng_core::{Article, Error, FilterPolicy, QuerySpec, Result};
}
