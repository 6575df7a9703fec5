//! Helpers for tests that talk to a live Qdrant instance.
//!
//! Tests call [`env_qdrant_url`] first and skip when `PAPER_QDRANT_URL` is unset.

mod error;

pub use error::{Error, Result};

use std::{collections::HashSet, env, sync::Mutex, thread, time::Duration};

use qdrant_client::{
	Qdrant,
	qdrant::{
		CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
		VectorParamsBuilder, VectorsConfigBuilder,
	},
};
use tokio::{runtime::Builder, time};
use uuid::Uuid;

/// Payload fields the paper filters match on.
pub const TAG_FIELDS: [&str; 2] = ["year", "category_tags"];

/// Scratch collections owned by one test, deleted on cleanup or drop.
pub struct TestCollections {
	qdrant_url: String,
	client: Qdrant,
	suffix: String,
	cleaned: bool,
	collections: Mutex<HashSet<String>>,
}
impl TestCollections {
	pub fn new(qdrant_url: &str) -> Result<Self> {
		let client = Qdrant::from_url(qdrant_url)
			.build()
			.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;

		Ok(Self {
			qdrant_url: qdrant_url.to_string(),
			client,
			suffix: Uuid::new_v4().simple().to_string(),
			cleaned: false,
			collections: Mutex::new(HashSet::new()),
		})
	}

	pub fn client(&self) -> &Qdrant {
		&self.client
	}

	pub fn collection_name(&self, prefix: &str) -> String {
		let collection = format!("{prefix}_{}", self.suffix);
		let mut tracked = self.collections.lock().unwrap_or_else(|err| err.into_inner());

		tracked.insert(collection.clone());

		collection
	}

	/// Creates a cosine collection with one named vector and keyword indexes on the tag fields.
	pub async fn create(&self, prefix: &str, vector_name: &str, vector_dim: u64) -> Result<String> {
		let collection = self.collection_name(prefix);
		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			vector_name,
			VectorParamsBuilder::new(vector_dim, Distance::Cosine),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(collection.clone()).vectors_config(vectors_config),
			)
			.await?;

		for field in TAG_FIELDS {
			self.client
				.create_field_index(
					CreateFieldIndexCollectionBuilder::new(
						collection.clone(),
						field,
						FieldType::Keyword,
					)
					.wait(true),
				)
				.await?;
		}

		Ok(collection)
	}

	pub async fn cleanup(mut self) -> Result<()> {
		let collections = self.tracked();

		cleanup_collections(&self.client, &collections).await?;

		self.cleaned = true;

		Ok(())
	}

	fn tracked(&self) -> Vec<String> {
		self.collections.lock().unwrap_or_else(|err| err.into_inner()).iter().cloned().collect()
	}
}
impl Drop for TestCollections {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let qdrant_url = self.qdrant_url.clone();
		let collections = self.tracked();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test Qdrant cleanup failed: {err}.");

					return;
				},
			};
			let client = match Qdrant::from_url(&qdrant_url).build() {
				Ok(client) => client,
				Err(err) => {
					eprintln!("Test Qdrant cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(cleanup_collections(&client, &collections)) {
				eprintln!("Test Qdrant cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("PAPER_QDRANT_URL").ok()
}

async fn cleanup_collections(client: &Qdrant, collections: &[String]) -> Result<()> {
	for collection in collections {
		let result =
			time::timeout(Duration::from_secs(10), client.delete_collection(collection.clone()))
				.await;

		match result {
			Ok(Ok(_)) => {},
			Ok(Err(err)) => {
				return Err(Error::Message(format!(
					"Failed to delete Qdrant collection {collection:?}: {err}."
				)));
			},
			Err(_) => {
				return Err(Error::Message(format!(
					"Timed out deleting Qdrant collection {collection:?}."
				)));
			},
		}
	}

	Ok(())
}
