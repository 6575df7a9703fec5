mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Loader, Providers, Qdrant, Search, Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_name.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_name must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding must list at least one provider.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for provider in &cfg.providers.embedding {
		if provider.provider_id.is_empty() {
			return Err(Error::Validation {
				message: "providers.embedding.provider_id must be non-empty.".to_string(),
			});
		}
		if !seen.insert(provider.provider_id.as_str()) {
			return Err(Error::Validation {
				message: format!(
					"providers.embedding.provider_id {:?} is declared more than once.",
					provider.provider_id
				),
			});
		}
		if provider.collection.is_empty() {
			return Err(Error::Validation {
				message: format!(
					"Provider {} collection must be non-empty.",
					provider.provider_id
				),
			});
		}
		if provider.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {} api_key must be non-empty.", provider.provider_id),
			});
		}
		if provider.dimensions == 0 {
			return Err(Error::Validation {
				message: format!(
					"Provider {} dimensions must be greater than zero.",
					provider.provider_id
				),
			});
		}
		if provider.default_headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: format!(
					"Provider {} default_headers values must be strings.",
					provider.provider_id
				),
			});
		}
	}

	if cfg.embedding_provider(&cfg.search.default_provider).is_none() {
		return Err(Error::Validation {
			message: "search.default_provider must name a configured embedding provider."
				.to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}

	if let Some(loader) = cfg.loader.as_ref()
		&& loader.batch_size == 0
	{
		return Err(Error::Validation {
			message: "loader.batch_size must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.default_provider = cfg.search.default_provider.trim().to_string();

	for provider in &mut cfg.providers.embedding {
		provider.provider_id = provider.provider_id.trim().to_string();
		provider.collection = provider.collection.trim().to_string();
		provider.default_headers.retain(|key, _| !key.trim().is_empty());
	}
}
