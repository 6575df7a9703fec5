pub mod loader;

mod error;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;

use paper_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = paper_cli::VERSION,
	rename_all = "kebab",
	styles = paper_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Dataset to load instead of `loader.dataset_path`.
	#[arg(long, value_name = "FILE")]
	pub dataset: Option<PathBuf>,
	/// Drop and recreate each provider collection, with its keyword indexes, before loading.
	#[arg(long)]
	pub recreate: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = paper_config::load(&args.config)?;

	paper_cli::init_tracing(&config.service.log_level);

	let Some(loader_cfg) = config.loader.as_ref() else {
		return Err(eyre::eyre!("The [loader] config section is required to load papers."));
	};
	let dataset = args.dataset.unwrap_or_else(|| loader_cfg.dataset_path.clone());
	let papers = loader::read_dataset(&dataset)?;

	tracing::info!(path = %dataset.display(), papers = papers.len(), "Read paper dataset.");

	let store = QdrantStore::new(&config.storage.qdrant)?;
	let reports = loader::load(
		&store,
		&config.providers.embedding,
		&papers,
		loader_cfg.batch_size as usize,
		args.recreate,
	)
	.await
	.inspect_err(|err| tracing::error!(error = %err, "Paper load aborted."))?;

	for report in reports {
		tracing::info!(
			provider = %report.provider_id,
			collection = %report.collection,
			points = report.points,
			batches = report.batches,
			"Loaded provider collection."
		);
	}

	Ok(())
}
