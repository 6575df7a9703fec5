pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<paper_storage::Error> for Error {
	fn from(err: paper_storage::Error) -> Self {
		match err {
			paper_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			paper_storage::Error::NotFound(message) => Self::NotFound { message },
			paper_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<paper_providers::Error> for Error {
	fn from(err: paper_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
