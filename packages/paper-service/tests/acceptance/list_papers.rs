use std::sync::Arc;

use paper_service::{ListRequest, PaperIndex, Predicate, count_query};

use super::{COLLECTION, MemoryIndex, memory_service, paper_ids};

#[tokio::test]
async fn unfiltered_listing_returns_every_paper() {
	let index = Arc::new(MemoryIndex::new());
	let service = memory_service(index.clone(), vec![0.0, 1.0, 0.0]);
	let response = service.list_papers(ListRequest::default()).await.expect("Listing failed.");
	let explicit = index
		.search(COLLECTION, &count_query(Predicate::MatchAll))
		.await
		.expect("Count failed.");

	assert_eq!(response.total, 5);
	assert_eq!(response.papers.len(), 5);
	assert_eq!(response.total, explicit.total);
	assert!(response.papers.iter().all(|paper| paper.similarity_score.is_none()));
	assert!(response.papers.iter().all(|paper| paper.fields.contains_key("abstract")));
}

#[tokio::test]
async fn year_selector_filters_total_and_rows() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);
	let response = service
		.list_papers(ListRequest { years: "2020,2021".to_string(), ..Default::default() })
		.await
		.expect("Listing failed.");

	assert_eq!(response.total, 2);
	assert_eq!(paper_ids(&response), vec!["p2", "p3"]);
}

#[tokio::test]
async fn combined_selectors_are_a_conjunction() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);
	let response = service
		.list_papers(ListRequest {
			years: "2020,2021,2022".to_string(),
			categories: "cs.LG".to_string(),
			..Default::default()
		})
		.await
		.expect("Listing failed.");

	assert_eq!(response.total, 2);
	assert_eq!(paper_ids(&response), vec!["p2", "p4"]);
}

#[tokio::test]
async fn paging_keeps_the_full_total() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);
	let response = service
		.list_papers(ListRequest { limit: Some(2), skip: 3, ..Default::default() })
		.await
		.expect("Listing failed.");

	assert_eq!(response.total, 5);
	assert_eq!(paper_ids(&response), vec!["p4", "p5"]);

	let empty = service
		.list_papers(ListRequest { limit: Some(0), ..Default::default() })
		.await
		.expect("Listing failed.");

	assert_eq!(empty.total, 5);
	assert!(empty.papers.is_empty());
}
