use serde::{Deserialize, Serialize};

use paper_config::EmbeddingProviderConfig;

use crate::{
	Error, PaperService, Result, SearchOutcome,
	filter::Selectors,
	query::{SIMILARITY_FIELDS, count_query, listing_query, similarity_query},
	response::{SearchResponse, assemble},
};

/// Paged listing with comma-separated selectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
	/// Page size; the configured default listing limit when absent.
	#[serde(default)]
	pub limit: Option<u64>,
	#[serde(default)]
	pub skip: u64,
	#[serde(default)]
	pub years: String,
	#[serde(default)]
	pub categories: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSimilarityRequest {
	pub paper_id: String,
	pub provider: String,
	#[serde(default = "default_number_of_results")]
	pub number_of_results: u32,
	#[serde(default)]
	pub years: Vec<u32>,
	#[serde(default)]
	pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTextSimilarityRequest {
	pub user_text: String,
	pub provider: String,
	#[serde(default = "default_number_of_results")]
	pub number_of_results: u32,
	#[serde(default)]
	pub years: Vec<u32>,
	#[serde(default)]
	pub categories: Vec<String>,
}

impl PaperService {
	/// Pages through the default provider's collection.
	pub async fn list_papers(&self, req: ListRequest) -> Result<SearchResponse> {
		let selectors = Selectors::from_csv(&req.years, &req.categories)?;
		let provider = self.resolve_provider(&self.cfg.search.default_provider)?;
		let limit = req.limit.unwrap_or(u64::from(self.cfg.search.default_list_limit));
		let query = listing_query(selectors.predicate(), req.skip, limit);
		let outcome = self.index.search(&provider.collection, &query).await?;

		tracing::debug!(
			provider = %provider.provider_id,
			collection = %provider.collection,
			skip = req.skip,
			limit,
			total = outcome.total,
			"Listed papers."
		);

		Ok(assemble(outcome.total, outcome.rows))
	}

	/// Papers nearest to a stored paper's vector in the provider's collection.
	pub async fn find_similar_to_paper(
		&self,
		req: PaperSimilarityRequest,
	) -> Result<SearchResponse> {
		let top_k = self.validate_top_k(req.number_of_results)?;
		let provider = self.resolve_provider(&req.provider)?;
		let paper_id = req.paper_id.trim();

		if paper_id.is_empty() {
			return Err(Error::InvalidRequest { message: "paper_id must be non-empty.".to_string() });
		}

		let Some(vector) = self.index.point_vector(&provider.collection, paper_id).await? else {
			tracing::info!(
				paper_id,
				collection = %provider.collection,
				"Paper not found for similarity search."
			);

			return Err(Error::NotFound {
				message: format!("Paper {paper_id} not found in {}.", provider.collection),
			});
		};
		let predicate = Selectors::from_lists(&req.years, &req.categories).predicate();
		let count = count_query(predicate.clone());
		let similar = similarity_query(vector, predicate, &SIMILARITY_FIELDS, top_k);
		let (counted, nearest) = tokio::try_join!(
			self.index.search(&provider.collection, &count),
			self.index.search(&provider.collection, &similar),
		)?;

		tracing::debug!(
			provider = %provider.provider_id,
			collection = %provider.collection,
			top_k,
			total = counted.total,
			returned = nearest.rows.len(),
			"Found papers similar to paper."
		);

		Ok(assemble(counted.total, nearest.rows))
	}

	/// Papers nearest to the embedding of free text.
	pub async fn find_similar_to_text(
		&self,
		req: UserTextSimilarityRequest,
	) -> Result<SearchResponse> {
		let top_k = self.validate_top_k(req.number_of_results)?;
		let provider = self.resolve_provider(&req.provider)?;

		if req.user_text.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "user_text must be non-empty.".to_string() });
		}

		let predicate = Selectors::from_lists(&req.years, &req.categories).predicate();
		let count = count_query(predicate.clone());
		let (vector, counted): (Vec<f32>, SearchOutcome) = tokio::try_join!(
			self.embed_query(provider, &req.user_text),
			self.index.search(&provider.collection, &count),
		)?;
		let similar = similarity_query(vector, predicate, &SIMILARITY_FIELDS, top_k);
		let nearest = self.index.search(&provider.collection, &similar).await?;

		tracing::debug!(
			provider = %provider.provider_id,
			collection = %provider.collection,
			top_k,
			total = counted.total,
			returned = nearest.rows.len(),
			"Found papers similar to text."
		);

		Ok(assemble(counted.total, nearest.rows))
	}

	pub(crate) fn resolve_provider(&self, provider_id: &str) -> Result<&EmbeddingProviderConfig> {
		self.cfg.embedding_provider(provider_id.trim()).ok_or_else(|| {
			tracing::info!(provider_id, "Unknown embedding provider.");

			Error::NotFound { message: format!("Unknown provider {provider_id:?}.") }
		})
	}

	fn validate_top_k(&self, number_of_results: u32) -> Result<u64> {
		let max = self.cfg.search.max_results;

		if number_of_results == 0 || number_of_results > max {
			return Err(Error::InvalidRequest {
				message: format!("number_of_results must be between 1 and {max}."),
			});
		}

		Ok(u64::from(number_of_results))
	}

	async fn embed_query(&self, provider: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
		let texts = [text.to_string()];
		let vectors = self.providers.embedding.embed(provider, &texts).await?;

		vectors.into_iter().next().filter(|vector| !vector.is_empty()).ok_or_else(|| {
			Error::Provider {
				message: format!("Provider {} returned no embedding.", provider.provider_id),
			}
		})
	}
}

fn default_number_of_results() -> u32 {
	15
}
