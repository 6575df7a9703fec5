use crate::filter::Predicate;

/// Name under which the distance of a nearest-neighbor row is reported.
pub const DISTANCE_FIELD: &str = "vector_distance";
/// Fields projected by similarity searches.
pub const SIMILARITY_FIELDS: [&str; 6] =
	["paper_id", "authors", "categories", "year", "title", DISTANCE_FIELD];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
	Nothing,
	All,
	Fields(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
	Count,
	Page { offset: u64, limit: u64 },
	Nearest { vector: Vec<f32>, top_k: u64 },
}

/// One query against a paper collection, executed once by a [`crate::PaperIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
	pub predicate: Predicate,
	pub projection: Projection,
	pub kind: QueryKind,
}

pub fn count_query(predicate: Predicate) -> QuerySpec {
	QuerySpec { predicate, projection: Projection::Nothing, kind: QueryKind::Count }
}

pub fn listing_query(predicate: Predicate, offset: u64, limit: u64) -> QuerySpec {
	QuerySpec { predicate, projection: Projection::All, kind: QueryKind::Page { offset, limit } }
}

/// Nearest-neighbor query returning up to `top_k` rows, nearest first.
///
/// The distance field is always projected, whether or not `fields` names it.
pub fn similarity_query(
	vector: Vec<f32>,
	predicate: Predicate,
	fields: &[&str],
	top_k: u64,
) -> QuerySpec {
	let mut projected: Vec<String> = fields.iter().map(|field| field.to_string()).collect();

	if !fields.contains(&DISTANCE_FIELD) {
		projected.push(DISTANCE_FIELD.to_string());
	}

	QuerySpec {
		predicate,
		projection: Projection::Fields(projected),
		kind: QueryKind::Nearest { vector, top_k },
	}
}
