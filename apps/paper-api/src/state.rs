use std::sync::Arc;

use paper_service::PaperService;
use paper_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PaperService>,
}
impl AppState {
	pub fn new(config: paper_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = PaperService::new(config, qdrant);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: PaperService) -> Self {
		Self { service: Arc::new(service) }
	}
}
