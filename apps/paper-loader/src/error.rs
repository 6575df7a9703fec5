use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read dataset at {path:?}.")]
	ReadDataset { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse dataset at {path:?}.")]
	ParseDataset { path: PathBuf, source: serde_json::Error },
	#[error("Record {index} ({paper_id}) is malformed: {message}")]
	Record { index: usize, paper_id: String, message: String },
	#[error("Batch {batch} for provider {provider_id}, starting at paper {first_paper_id}, failed.")]
	Batch {
		provider_id: String,
		batch: usize,
		first_paper_id: String,
		source: paper_storage::Error,
	},
	#[error("Failed to recreate collection {collection} for provider {provider_id}.")]
	Collection { provider_id: String, collection: String, source: paper_storage::Error },
	#[error("{0}")]
	Validation(String),
}
