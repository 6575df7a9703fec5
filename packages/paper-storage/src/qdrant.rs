use std::{collections::HashMap, time::Duration};

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		CountPointsBuilder, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance,
		FieldType, Filter, GetPointsBuilder, ListValue, PayloadIncludeSelector, PointId,
		PointStruct, Query, QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, Value, Vector,
		VectorOutput, VectorParamsBuilder, VectorsConfigBuilder, value::Kind, vector_output,
		vectors_output::VectorsOptions, with_payload_selector::SelectorOptions,
	},
};
use serde_json::{Map, Value as JsonValue};

use crate::{Error, Result, models::PaperRecord};

/// Payload field carrying the original paper identifier.
pub const PAPER_ID_FIELD: &str = "paper_id";
pub const YEAR_FIELD: &str = "year";
/// Lowercased category tags; keyword matches on this field ignore case.
pub const CATEGORY_TAGS_FIELD: &str = "category_tags";
/// Keyword-indexed payload fields of a paper collection.
pub const TAG_INDEX_FIELDS: [&str; 2] = [YEAR_FIELD, CATEGORY_TAGS_FIELD];

/// Which payload fields a read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadFields {
	None,
	All,
	Only(Vec<String>),
}

/// A nearest-neighbor hit: its payload and its cosine distance to the query vector.
#[derive(Debug, Clone)]
pub struct ScoredPayload {
	pub payload: Map<String, JsonValue>,
	pub distance: f64,
}

pub struct QdrantStore {
	pub client: Qdrant,
	pub vector_name: String,
}
impl QdrantStore {
	pub fn new(cfg: &paper_config::Qdrant) -> Result<Self> {
		let client =
			Qdrant::from_url(&cfg.url).timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { client, vector_name: cfg.vector_name.clone() })
	}

	/// Exact number of points in `collection` matching `filter`.
	pub async fn count(&self, collection: &str, filter: Option<Filter>) -> Result<u64> {
		let mut count = CountPointsBuilder::new(collection).exact(true);

		if let Some(filter) = filter {
			count = count.filter(filter);
		}

		let response = self.client.count(count).await?;

		Ok(response.result.map(|result| result.count).unwrap_or(0))
	}

	/// Filtered points in id order, skipping `offset` and returning at most `limit`.
	pub async fn page(
		&self,
		collection: &str,
		filter: Option<Filter>,
		offset: u64,
		limit: u64,
		fields: &PayloadFields,
	) -> Result<Vec<Map<String, JsonValue>>> {
		if limit == 0 {
			return Ok(Vec::new());
		}

		let mut query = QueryPointsBuilder::new(collection)
			.offset(offset)
			.limit(limit)
			.with_payload(payload_selector(fields))
			.with_vectors(false);

		if let Some(filter) = filter {
			query = query.filter(filter);
		}

		let response = self.client.query(query).await?;

		Ok(response.result.into_iter().map(|point| payload_to_json(point.payload)).collect())
	}

	/// Up to `top_k` nearest points to `vector`, nearest first.
	pub async fn nearest(
		&self,
		collection: &str,
		vector: Vec<f32>,
		filter: Option<Filter>,
		top_k: u64,
		fields: &PayloadFields,
	) -> Result<Vec<ScoredPayload>> {
		let mut query = QueryPointsBuilder::new(collection)
			.query(Query::new_nearest(vector))
			.using(self.vector_name.as_str())
			.limit(top_k)
			.with_payload(payload_selector(fields))
			.with_vectors(false);

		if let Some(filter) = filter {
			query = query.filter(filter);
		}

		let response = self.client.query(query).await?;

		Ok(response.result.into_iter().map(scored_payload).collect())
	}

	/// Stored vector of one paper, looked up by id rather than searched for.
	pub async fn point_vector(&self, collection: &str, paper_id: &str) -> Result<Option<Vec<f32>>> {
		let ids = vec![PointId::from(paper_point_id(paper_id).to_string())];
		let get = GetPointsBuilder::new(collection, ids).with_payload(false).with_vectors(true);
		let response = self.client.get_points(get).await?;
		let Some(point) = response.result.into_iter().next() else {
			return Ok(None);
		};
		let Some(options) = point.vectors.and_then(|vectors| vectors.vectors_options) else {
			return Ok(None);
		};

		Ok(select_vector(options, &self.vector_name))
	}

	/// Drops `collection` if present and creates it empty: cosine distance over the named vector,
	/// keyword indexes on the tag fields.
	pub async fn recreate_collection(&self, collection: &str, vector_dim: u64) -> Result<()> {
		if self.client.collection_exists(collection.to_string()).await? {
			self.client.delete_collection(collection.to_string()).await?;
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			self.vector_name.as_str(),
			VectorParamsBuilder::new(vector_dim, Distance::Cosine),
		);

		self.client
			.create_collection(CreateCollectionBuilder::new(collection).vectors_config(vectors_config))
			.await?;

		for field in TAG_INDEX_FIELDS {
			self.client
				.create_field_index(
					CreateFieldIndexCollectionBuilder::new(collection, field, FieldType::Keyword)
						.wait(true),
				)
				.await?;
		}

		Ok(())
	}

	pub async fn upsert(&self, collection: &str, points: Vec<PointStruct>) -> Result<()> {
		let upsert = UpsertPointsBuilder::new(collection, points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	/// Builds the point for `paper` in a provider collection.
	pub fn paper_point(&self, paper: &PaperRecord, vector: Vec<f32>) -> Result<PointStruct> {
		let mut vectors = HashMap::new();

		vectors.insert(self.vector_name.clone(), Vector::from(vector));

		let payload = Payload::from(paper_payload(paper)?);

		Ok(PointStruct::new(paper_point_id(&paper.id).to_string(), vectors, payload))
	}
}

pub fn paper_payload(paper: &PaperRecord) -> Result<HashMap<String, Value>> {
	let year = paper
		.year_tag()
		.ok_or_else(|| Error::InvalidArgument(format!("Paper {} has no usable year.", paper.id)))?;
	let categories = paper.category_tags();
	let lowered = categories.iter().map(|tag| tag.to_lowercase()).collect::<Vec<_>>();
	let mut payload = HashMap::new();

	payload.insert(PAPER_ID_FIELD.to_string(), Value::from(paper.id.clone()));
	payload.insert("title".to_string(), Value::from(paper.title.clone()));
	payload.insert("authors".to_string(), Value::from(paper.authors.clone()));
	payload.insert("abstract".to_string(), Value::from(paper.paper_abstract.clone()));
	payload.insert("categories".to_string(), string_list(categories));
	payload.insert(CATEGORY_TAGS_FIELD.to_string(), string_list(lowered));
	payload.insert(YEAR_FIELD.to_string(), Value::from(year));

	Ok(payload)
}

/// Qdrant point ids must be integers or UUIDs, so paper ids are mapped onto a stable UUID.
pub fn paper_point_id(paper_id: &str) -> uuid::Uuid {
	uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, paper_id.as_bytes())
}

pub fn payload_to_json(payload: HashMap<String, Value>) -> Map<String, JsonValue> {
	payload.into_iter().map(|(key, value)| (key, value_to_json(value))).collect()
}

fn value_to_json(value: Value) -> JsonValue {
	match value.kind {
		None | Some(Kind::NullValue(_)) => JsonValue::Null,
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(flag),
		Some(Kind::IntegerValue(number)) => JsonValue::from(number),
		Some(Kind::DoubleValue(number)) => serde_json::Number::from_f64(number)
			.map(JsonValue::Number)
			.unwrap_or(JsonValue::Null),
		Some(Kind::StringValue(text)) => JsonValue::String(text),
		Some(Kind::ListValue(list)) =>
			JsonValue::Array(list.values.into_iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => JsonValue::Object(
			object.fields.into_iter().map(|(key, value)| (key, value_to_json(value))).collect(),
		),
	}
}

fn string_list(values: Vec<String>) -> Value {
	let values = values.into_iter().map(Value::from).collect();

	Value { kind: Some(Kind::ListValue(ListValue { values })) }
}

fn scored_payload(point: ScoredPoint) -> ScoredPayload {
	// Collections use cosine distance, where Qdrant reports similarity as the score.
	ScoredPayload {
		payload: payload_to_json(point.payload),
		distance: 1.0 - f64::from(point.score),
	}
}

fn payload_selector(fields: &PayloadFields) -> SelectorOptions {
	match fields {
		PayloadFields::None => SelectorOptions::Enable(false),
		PayloadFields::All => SelectorOptions::Enable(true),
		PayloadFields::Only(fields) =>
			SelectorOptions::Include(PayloadIncludeSelector { fields: fields.clone() }),
	}
}

fn select_vector(options: VectorsOptions, vector_name: &str) -> Option<Vec<f32>> {
	let output = match options {
		VectorsOptions::Vector(output) => Some(output),
		VectorsOptions::Vectors(mut named) => named.vectors.remove(vector_name),
	};

	output.and_then(dense_vector)
}

#[allow(deprecated)]
fn dense_vector(output: VectorOutput) -> Option<Vec<f32>> {
	match output.vector {
		Some(vector_output::Vector::Dense(dense)) => Some(dense.data),
		Some(_) => None,
		None if !output.data.is_empty() => Some(output.data),
		None => None,
	}
}
