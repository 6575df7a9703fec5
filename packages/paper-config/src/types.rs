use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub search: Search,
	pub providers: Providers,
	pub loader: Option<Loader>,
}
impl Config {
	/// Looks up an embedding provider by its `provider_id`.
	pub fn embedding_provider(&self, provider_id: &str) -> Option<&EmbeddingProviderConfig> {
		self.providers.embedding.iter().find(|provider| provider.provider_id == provider_id)
	}
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	#[serde(default = "default_vector_name")]
	pub vector_name: String,
	#[serde(default = "default_qdrant_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Provider whose collection backs the unfiltered paper listing.
	pub default_provider: String,
	/// Upper bound for `number_of_results` on similarity requests.
	#[serde(default = "default_max_results")]
	pub max_results: u32,
	#[serde(default = "default_list_limit")]
	pub default_list_limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: Vec<EmbeddingProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	/// Qdrant collection holding the vectors produced by this provider.
	pub collection: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Loader {
	pub dataset_path: std::path::PathBuf,
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
}

fn default_vector_name() -> String {
	"vector".to_string()
}

fn default_qdrant_timeout_ms() -> u64 {
	10_000
}

fn default_max_results() -> u32 {
	100
}

fn default_list_limit() -> u32 {
	20
}

fn default_batch_size() -> u32 {
	256
}
