use std::{collections::HashSet, sync::Arc};

use serde_json::Value;

use paper_service::{ListRequest, PaperService, PaperSimilarityRequest, Providers, QdrantIndex};
use paper_storage::{models::PaperRecord, qdrant::QdrantStore};
use paper_testkit::TestCollections;

use super::{FixedEmbedding, fixture_papers, paper_ids};

#[tokio::test]
async fn qdrant_index_matches_the_in_memory_semantics() {
	let Some(qdrant_url) = paper_testkit::env_qdrant_url() else {
		eprintln!("Skipping qdrant_index_matches_the_in_memory_semantics; set PAPER_QDRANT_URL.");

		return;
	};
	let collections = TestCollections::new(&qdrant_url).expect("Failed to create test collections.");
	let collection =
		collections.create("papers", "vector", 3).await.expect("Failed to create collection.");
	let mut cfg = super::test_config(&collection);

	cfg.storage.qdrant.url = qdrant_url;

	let store = QdrantStore::new(&cfg.storage.qdrant).expect("Failed to create Qdrant store.");
	let points = fixture_papers()
		.into_iter()
		.map(|(mut fields, vector)| {
			let paper_id = fields.get("paper_id").cloned().unwrap_or(Value::Null);

			fields.insert("id".to_string(), paper_id);

			let paper: PaperRecord = serde_json::from_value(Value::Object(fields))
				.expect("Failed to decode paper fixture.");

			store.paper_point(&paper, vector)
		})
		.collect::<paper_storage::Result<Vec<_>>>()
		.expect("Failed to build points.");

	store.upsert(&collection, points).await.expect("Failed to upsert points.");

	let service = PaperService::with_providers(
		cfg,
		Arc::new(QdrantIndex::new(store)),
		Providers::new(Arc::new(FixedEmbedding { vector: vec![0.0, 1.0, 0.0] })),
	);
	let all = service.list_papers(ListRequest::default()).await.expect("Listing failed.");

	assert_eq!(all.total, 5);
	assert_eq!(all.papers.len(), 5);

	let filtered = service
		.list_papers(ListRequest { years: "2020,2021".to_string(), ..Default::default() })
		.await
		.expect("Listing failed.");
	let ids: HashSet<_> = paper_ids(&filtered).into_iter().collect();

	assert_eq!(filtered.total, 2);
	assert_eq!(ids, HashSet::from(["p2".to_string(), "p3".to_string()]));

	let similar = service
		.find_similar_to_paper(PaperSimilarityRequest {
			paper_id: "p1".to_string(),
			provider: "local".to_string(),
			number_of_results: 2,
			years: Vec::new(),
			categories: vec!["cs.LG".to_string()],
		})
		.await
		.expect("Search failed.");

	assert_eq!(similar.total, 3);
	assert_eq!(paper_ids(&similar), vec!["p1", "p2"]);
	assert!(similar.papers.iter().all(|paper| paper.similarity_score.is_some()));

	collections.cleanup().await.expect("Failed to clean up collections.");
}
