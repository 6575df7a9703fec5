use std::{collections::HashSet, sync::Arc, sync::atomic::Ordering};

use paper_service::{Error, PaperSimilarityRequest, UserTextSimilarityRequest};

use super::{MemoryIndex, memory_service, paper_ids};

fn paper_request(top_k: u32, years: Vec<u32>, categories: &[&str]) -> PaperSimilarityRequest {
	PaperSimilarityRequest {
		paper_id: "p1".to_string(),
		provider: "local".to_string(),
		number_of_results: top_k,
		years,
		categories: categories.iter().map(|category| category.to_string()).collect(),
	}
}

#[tokio::test]
async fn similar_papers_come_back_nearest_first() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);
	let response = service
		.find_similar_to_paper(paper_request(3, Vec::new(), &[]))
		.await
		.expect("Search failed.");
	let distances: Vec<f64> =
		response.papers.iter().filter_map(|paper| paper.vector_distance()).collect();

	assert_eq!(response.total, 5);
	assert_eq!(paper_ids(&response), vec!["p1", "p2", "p4"]);
	assert_eq!(distances.len(), 3);
	assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
	assert_eq!(response.papers[0].similarity_score, Some(1.0));
	assert!(!response.papers[0].fields.contains_key("abstract"));
}

#[tokio::test]
async fn filtered_total_is_independent_of_top_k() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);

	for top_k in [1, 2, 10] {
		let response = service
			.find_similar_to_paper(paper_request(top_k, Vec::new(), &["cs.LG"]))
			.await
			.expect("Search failed.");

		assert_eq!(response.total, 3);
		assert_eq!(response.papers.len(), (top_k as usize).min(3));
	}
}

#[tokio::test]
async fn count_and_similarity_agree_on_membership() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);
	let response = service
		.find_similar_to_paper(paper_request(100, vec![2019, 2022], &["cs.LG", "cs.CL"]))
		.await
		.expect("Search failed.");
	let ids: HashSet<_> = paper_ids(&response).into_iter().collect();

	assert_eq!(response.total as usize, response.papers.len());
	assert_eq!(ids, HashSet::from(["p1".to_string(), "p4".to_string()]));
}

#[tokio::test]
async fn unknown_paper_runs_no_search() {
	let index = Arc::new(MemoryIndex::new());
	let service = memory_service(index.clone(), vec![0.0, 1.0, 0.0]);
	let err = service
		.find_similar_to_paper(PaperSimilarityRequest {
			paper_id: "missing".to_string(),
			..paper_request(3, Vec::new(), &[])
		})
		.await
		.expect_err("Expected NotFound.");

	assert!(matches!(err, Error::NotFound { .. }));
	assert_eq!(index.searches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn text_search_scores_the_embedded_query() {
	let service = memory_service(Arc::new(MemoryIndex::new()), vec![0.0, 1.0, 0.0]);
	let response = service
		.find_similar_to_text(UserTextSimilarityRequest {
			user_text: "language models".to_string(),
			provider: "local".to_string(),
			number_of_results: 2,
			years: Vec::new(),
			categories: Vec::new(),
		})
		.await
		.expect("Search failed.");

	assert_eq!(response.total, 5);
	assert_eq!(paper_ids(&response), vec!["p3", "p4"]);
	assert_eq!(response.papers[0].similarity_score, Some(1.0));
	assert_eq!(response.papers[0].vector_distance(), Some(0.0));
}
