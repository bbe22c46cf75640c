pub mod sources;

pub use sources::{create_source, NewsApiFetcher};

pub mod prelude {
    pub use super::sources::{create_source, NewsApiFetcher};
    pub use ns_core::{Article, ArticleSource, FetchError, Result};
}
