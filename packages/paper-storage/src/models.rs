use serde::Deserialize;
use serde_json::{Map, Value};

/// Separator used when several category tags share one string field.
pub const TAG_SEPARATOR: char = '|';

/// One record of the bulk paper dataset.
///
/// Provider vectors live beside the paper fields, keyed by provider id, and are collected into
/// `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperRecord {
	pub id: String,
	pub title: String,
	#[serde(default)]
	pub authors: String,
	#[serde(rename = "abstract", default)]
	pub paper_abstract: String,
	#[serde(default)]
	pub categories: String,
	pub year: Value,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl PaperRecord {
	/// Category tags, split on either the dataset's comma or the stored tag separator.
	pub fn category_tags(&self) -> Vec<String> {
		split_tags(&self.categories)
	}

	pub fn year_tag(&self) -> Option<String> {
		match &self.year {
			Value::String(year) if !year.trim().is_empty() => Some(year.trim().to_string()),
			Value::Number(year) => year.as_u64().map(|year| year.to_string()),
			_ => None,
		}
	}

	/// Vector stored under `provider_id`, if present and numeric.
	pub fn provider_vector(&self, provider_id: &str) -> Option<Vec<f32>> {
		let values = self.extra.get(provider_id)?.as_array()?;
		let mut vec = Vec::with_capacity(values.len());

		for value in values {
			vec.push(value.as_f64()? as f32);
		}

		Some(vec)
	}
}

pub fn split_tags(raw: &str) -> Vec<String> {
	raw.split([',', TAG_SEPARATOR])
		.map(str::trim)
		.filter(|tag| !tag.is_empty())
		.map(str::to_string)
		.collect()
}
