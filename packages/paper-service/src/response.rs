use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::DISTANCE_FIELD;

/// A row as returned by an index, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
	Plain(Map<String, Value>),
	WithDistance { fields: Map<String, Value>, distance: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPaper {
	#[serde(flatten)]
	pub fields: Map<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub similarity_score: Option<f64>,
}
impl NormalizedPaper {
	pub fn vector_distance(&self) -> Option<f64> {
		self.fields.get(DISTANCE_FIELD).and_then(Value::as_f64)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	/// Matching records, independent of the page size or top-K.
	pub total: u64,
	pub papers: Vec<NormalizedPaper>,
}

/// Normalizes index rows in their original order.
pub fn assemble(total: u64, rows: Vec<RawResult>) -> SearchResponse {
	SearchResponse { total, papers: rows.into_iter().map(normalize).collect() }
}

fn normalize(row: RawResult) -> NormalizedPaper {
	match row {
		RawResult::Plain(fields) => NormalizedPaper { fields, similarity_score: None },
		RawResult::WithDistance { mut fields, distance } => {
			fields.insert(DISTANCE_FIELD.to_string(), Value::from(distance));

			NormalizedPaper { fields, similarity_score: Some(1.0 - distance) }
		},
	}
}
