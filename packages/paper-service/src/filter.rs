use qdrant_client::qdrant::{Condition, Filter};
use serde_json::{Map, Value};

use paper_storage::qdrant::{CATEGORY_TAGS_FIELD, YEAR_FIELD};

use crate::{Error, Result};

/// Indexed tag fields a selector can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
	Year,
	Categories,
}
impl TagField {
	/// Field holding the tags in a paper record.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Year => "year",
			Self::Categories => "categories",
		}
	}

	/// Keyword-indexed payload field the Qdrant filter matches on.
	pub fn index_field(self) -> &'static str {
		match self {
			Self::Year => YEAR_FIELD,
			Self::Categories => CATEGORY_TAGS_FIELD,
		}
	}
}

/// Boolean expression over the indexed tag fields of a paper.
///
/// `TagIn` matches when any tag of the field is one of `values`, ignoring case. A field may carry
/// several tags, either as a JSON array or as one string joined by `|` or `,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
	MatchAll,
	TagIn { field: TagField, values: Vec<String> },
	And(Box<Predicate>, Box<Predicate>),
}
impl Predicate {
	pub fn is_match_all(&self) -> bool {
		matches!(self, Self::MatchAll)
	}

	/// Evaluates the predicate against one record's fields.
	pub fn matches(&self, record: &Map<String, Value>) -> bool {
		match self {
			Self::MatchAll => true,
			Self::TagIn { field, values } => record
				.get(field.as_str())
				.map(field_tags)
				.unwrap_or_default()
				.iter()
				.any(|tag| values.iter().any(|value| value.eq_ignore_ascii_case(tag))),
			Self::And(left, right) => left.matches(record) && right.matches(record),
		}
	}

	/// Qdrant filter with the same membership as [`Predicate::matches`]; `None` matches everything.
	pub fn to_qdrant_filter(&self) -> Option<Filter> {
		let mut conditions = Vec::new();

		self.collect_conditions(&mut conditions);

		if conditions.is_empty() { None } else { Some(Filter::must(conditions)) }
	}

	fn collect_conditions(&self, out: &mut Vec<Condition>) {
		match self {
			Self::MatchAll => {},
			Self::TagIn { field, values } => out.push(Condition::matches(
				field.index_field(),
				values.iter().map(|value| value.to_lowercase()).collect::<Vec<_>>(),
			)),
			Self::And(left, right) => {
				left.collect_conditions(out);
				right.collect_conditions(out);
			},
		}
	}
}

/// Year and category selectors of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
	pub years: Vec<String>,
	pub categories: Vec<String>,
}
impl Selectors {
	/// Parses comma-separated selectors as sent in listing query strings.
	pub fn from_csv(years: &str, categories: &str) -> Result<Self> {
		let years = split_csv(years);

		if let Some(bad) = years.iter().find(|year| year.parse::<u32>().is_err()) {
			return Err(Error::InvalidRequest {
				message: format!("years must be comma-separated integers, got {bad:?}."),
			});
		}

		Ok(Self { years, categories: split_csv(categories) })
	}

	pub fn from_lists(years: &[u32], categories: &[String]) -> Self {
		Self {
			years: years.iter().map(u32::to_string).collect(),
			categories: categories
				.iter()
				.map(|category| category.trim())
				.filter(|category| !category.is_empty())
				.map(str::to_string)
				.collect(),
		}
	}

	pub fn predicate(&self) -> Predicate {
		build_filter_expression(&self.years, &self.categories)
	}
}

/// Composes the year and category selectors into one predicate.
pub fn build_filter_expression(years: &[String], categories: &[String]) -> Predicate {
	match (tag_in(TagField::Year, years), tag_in(TagField::Categories, categories)) {
		(None, None) => Predicate::MatchAll,
		(Some(year), None) => year,
		(None, Some(category)) => category,
		(Some(year), Some(category)) => Predicate::And(Box::new(year), Box::new(category)),
	}
}

fn tag_in(field: TagField, values: &[String]) -> Option<Predicate> {
	let mut unique: Vec<String> = Vec::with_capacity(values.len());

	for value in values {
		let value = value.to_lowercase();

		if !unique.contains(&value) {
			unique.push(value);
		}
	}

	if unique.is_empty() { None } else { Some(Predicate::TagIn { field, values: unique }) }
}

fn split_csv(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

fn field_tags(value: &Value) -> Vec<String> {
	match value {
		Value::String(raw) => paper_storage::models::split_tags(raw),
		Value::Number(number) => vec![number.to_string()],
		Value::Array(items) => items.iter().flat_map(field_tags).collect(),
		_ => Vec::new(),
	}
}
