use std::{fs, future::Future, path::Path, pin::Pin};

use qdrant_client::qdrant::PointStruct;
use serde_json::Value;

use paper_config::EmbeddingProviderConfig;
use paper_storage::{models::PaperRecord, qdrant::QdrantStore};

use crate::{Error, Result};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Destination of loaded paper points.
pub trait PaperSink
where
	Self: Send + Sync,
{
	fn point(&self, paper: &PaperRecord, vector: Vec<f32>) -> paper_storage::Result<PointStruct>;

	/// Replaces `collection` with an empty one sized for `dimensions`.
	fn recreate<'a>(
		&'a self,
		collection: &'a str,
		dimensions: u64,
	) -> BoxFuture<'a, paper_storage::Result<()>>;

	fn upsert<'a>(
		&'a self,
		collection: &'a str,
		points: Vec<PointStruct>,
	) -> BoxFuture<'a, paper_storage::Result<()>>;
}
impl PaperSink for QdrantStore {
	fn point(&self, paper: &PaperRecord, vector: Vec<f32>) -> paper_storage::Result<PointStruct> {
		self.paper_point(paper, vector)
	}

	fn recreate<'a>(
		&'a self,
		collection: &'a str,
		dimensions: u64,
	) -> BoxFuture<'a, paper_storage::Result<()>> {
		Box::pin(self.recreate_collection(collection, dimensions))
	}

	fn upsert<'a>(
		&'a self,
		collection: &'a str,
		points: Vec<PointStruct>,
	) -> BoxFuture<'a, paper_storage::Result<()>> {
		Box::pin(QdrantStore::upsert(self, collection, points))
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
	pub provider_id: String,
	pub collection: String,
	pub points: usize,
	pub batches: usize,
}

pub fn read_dataset(path: &Path) -> Result<Vec<PaperRecord>> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadDataset { path: path.to_path_buf(), source: err })?;

	parse_dataset(&raw, path)
}

/// Decodes a JSON array of papers, naming the first record that does not decode.
pub fn parse_dataset(raw: &str, path: &Path) -> Result<Vec<PaperRecord>> {
	let values: Vec<Value> = serde_json::from_str(raw)
		.map_err(|err| Error::ParseDataset { path: path.to_path_buf(), source: err })?;

	values
		.into_iter()
		.enumerate()
		.map(|(index, value)| {
			let paper_id = record_id(&value);

			serde_json::from_value(value).map_err(|err| Error::Record {
				index,
				paper_id,
				message: err.to_string(),
			})
		})
		.collect()
}

/// Loads every paper into every provider collection.
///
/// All points are built before the first upsert, so a malformed record writes nothing. With
/// `recreate`, each provider collection is dropped and created again right before its first batch.
/// A failed batch stops the load; batches already written stay in place.
pub async fn load<S>(
	sink: &S,
	providers: &[EmbeddingProviderConfig],
	papers: &[PaperRecord],
	batch_size: usize,
	recreate: bool,
) -> Result<Vec<LoadReport>>
where
	S: PaperSink,
{
	if batch_size == 0 {
		return Err(Error::Validation("Batch size must be greater than zero.".to_string()));
	}

	let mut plans = Vec::with_capacity(providers.len());

	for provider in providers {
		plans.push((provider, provider_points(sink, provider, papers)?));
	}

	let mut reports = Vec::with_capacity(plans.len());

	for (provider, mut points) in plans {
		let total = points.len();
		let mut batch = 0;
		let mut loaded = 0;

		if recreate {
			sink.recreate(&provider.collection, u64::from(provider.dimensions)).await.map_err(
				|err| Error::Collection {
					provider_id: provider.provider_id.clone(),
					collection: provider.collection.clone(),
					source: err,
				},
			)?;

			tracing::info!(
				provider = %provider.provider_id,
				collection = %provider.collection,
				"Recreated collection."
			);
		}

		while !points.is_empty() {
			let rest = points.split_off(batch_size.min(points.len()));
			let chunk = std::mem::replace(&mut points, rest);
			let size = chunk.len();

			if let Err(err) = sink.upsert(&provider.collection, chunk).await {
				tracing::error!(
					error = %err,
					provider = %provider.provider_id,
					batch,
					"Failed to upsert paper batch."
				);

				return Err(Error::Batch {
					provider_id: provider.provider_id.clone(),
					batch,
					first_paper_id: papers
						.get(loaded)
						.map(|paper| paper.id.clone())
						.unwrap_or_default(),
					source: err,
				});
			}

			loaded += size;
			batch += 1;

			tracing::info!(provider = %provider.provider_id, batch, loaded, total, "Upserted batch.");
		}

		reports.push(LoadReport {
			provider_id: provider.provider_id.clone(),
			collection: provider.collection.clone(),
			points: total,
			batches: batch,
		});
	}

	Ok(reports)
}

fn provider_points<S>(
	sink: &S,
	provider: &EmbeddingProviderConfig,
	papers: &[PaperRecord],
) -> Result<Vec<PointStruct>>
where
	S: PaperSink,
{
	let mut points = Vec::with_capacity(papers.len());

	for (index, paper) in papers.iter().enumerate() {
		let malformed = |message: String| Error::Record {
			index,
			paper_id: paper.id.clone(),
			message,
		};
		let vector = paper.provider_vector(&provider.provider_id).ok_or_else(|| {
			malformed(format!("Missing numeric vector for provider {}.", provider.provider_id))
		})?;

		if vector.len() != provider.dimensions as usize {
			return Err(malformed(format!(
				"Vector for provider {} has {} dimensions, expected {}.",
				provider.provider_id,
				vector.len(),
				provider.dimensions
			)));
		}

		points.push(sink.point(paper, vector).map_err(|err| malformed(err.to_string()))?);
	}

	Ok(points)
}

fn record_id(value: &Value) -> String {
	match value.get("id") {
		Some(Value::String(id)) => id.clone(),
		Some(other) => other.to_string(),
		None => "<missing id>".to_string(),
	}
}
