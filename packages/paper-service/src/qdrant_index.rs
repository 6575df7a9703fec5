use paper_storage::qdrant::{PayloadFields, QdrantStore};

use crate::{
	BoxFuture, PaperIndex, Result, SearchOutcome,
	query::{DISTANCE_FIELD, Projection, QueryKind, QuerySpec},
	response::RawResult,
};

/// [`PaperIndex`] backed by Qdrant collections.
pub struct QdrantIndex {
	pub store: QdrantStore,
}
impl QdrantIndex {
	pub fn new(store: QdrantStore) -> Self {
		Self { store }
	}

	async fn run(&self, collection: &str, query: &QuerySpec) -> Result<SearchOutcome> {
		let filter = query.predicate.to_qdrant_filter();
		let fields = payload_fields(&query.projection);

		match &query.kind {
			QueryKind::Count => {
				let total = self.store.count(collection, filter).await?;

				Ok(SearchOutcome { total, rows: Vec::new() })
			},
			// Qdrant pages carry no total, so the count runs beside the page.
			QueryKind::Page { offset, limit } => {
				let (total, rows) = tokio::try_join!(
					self.store.count(collection, filter.clone()),
					self.store.page(collection, filter, *offset, *limit, &fields),
				)?;

				Ok(SearchOutcome { total, rows: rows.into_iter().map(RawResult::Plain).collect() })
			},
			QueryKind::Nearest { vector, top_k } => {
				let hits =
					self.store.nearest(collection, vector.clone(), filter, *top_k, &fields).await?;
				let rows = hits
					.into_iter()
					.map(|hit| RawResult::WithDistance { fields: hit.payload, distance: hit.distance })
					.collect::<Vec<_>>();

				Ok(SearchOutcome { total: rows.len() as u64, rows })
			},
		}
	}
}
impl PaperIndex for QdrantIndex {
	fn search<'a>(
		&'a self,
		collection: &'a str,
		query: &'a QuerySpec,
	) -> BoxFuture<'a, Result<SearchOutcome>> {
		Box::pin(self.run(collection, query))
	}

	fn point_vector<'a>(
		&'a self,
		collection: &'a str,
		paper_id: &'a str,
	) -> BoxFuture<'a, Result<Option<Vec<f32>>>> {
		Box::pin(async move { Ok(self.store.point_vector(collection, paper_id).await?) })
	}
}

/// The distance is computed by the engine, not stored, so it never reaches the payload selector.
fn payload_fields(projection: &Projection) -> PayloadFields {
	match projection {
		Projection::Nothing => PayloadFields::None,
		Projection::All => PayloadFields::All,
		Projection::Fields(fields) => PayloadFields::Only(
			fields.iter().filter(|field| *field != DISTANCE_FIELD).cloned().collect(),
		),
	}
}
