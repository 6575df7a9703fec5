pub mod filter;
pub mod qdrant_index;
pub mod query;
pub mod response;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use filter::{Predicate, Selectors, TagField, build_filter_expression};
pub use qdrant_index::QdrantIndex;
pub use query::{
	DISTANCE_FIELD, Projection, QueryKind, QuerySpec, SIMILARITY_FIELDS, count_query,
	listing_query, similarity_query,
};
pub use response::{NormalizedPaper, RawResult, SearchResponse, assemble};
pub use search::{ListRequest, PaperSimilarityRequest, UserTextSimilarityRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use paper_config::{Config, EmbeddingProviderConfig};
use paper_storage::qdrant::QdrantStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// A searchable store of paper collections, one per embedding provider.
pub trait PaperIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		collection: &'a str,
		query: &'a QuerySpec,
	) -> BoxFuture<'a, Result<SearchOutcome>>;

	/// Stored vector of `paper_id`, or `None` when the collection has no such paper.
	fn point_vector<'a>(
		&'a self,
		collection: &'a str,
		paper_id: &'a str,
	) -> BoxFuture<'a, Result<Option<Vec<f32>>>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
	pub total: u64,
	pub rows: Vec<RawResult>,
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

pub struct PaperService {
	pub cfg: Config,
	pub index: Arc<dyn PaperIndex>,
	pub providers: Providers,
}
impl PaperService {
	pub fn new(cfg: Config, qdrant: QdrantStore) -> Self {
		Self::with_providers(cfg, Arc::new(QdrantIndex::new(qdrant)), Providers::default())
	}

	pub fn with_providers(cfg: Config, index: Arc<dyn PaperIndex>, providers: Providers) -> Self {
		Self { cfg, index, providers }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(paper_providers::embedding::embed(cfg, texts).await?) })
	}
}
